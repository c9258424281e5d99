//! Insurance contract ABI bindings.

use alloy::sol;

sol! {
    /// Emitted when a policy is created for a holder.
    #[derive(Debug)]
    event PolicyCreated(
        uint256 indexed policyId,
        address indexed policyHolder,
        uint256 premium,
        uint256 coverage,
        uint8 policyType
    );

    /// Buy a policy; the premium is attached as the call value.
    function createPolicy(uint256 coverageAmount, uint8 policyType, uint256 duration)
        external
        payable
        returns (uint256);

    /// Plan IDs held by `user`.
    function getUserPolicies(address user) external view returns (uint256[] memory);

    /// File a claim against a held policy.
    function submitClaim(uint256 policyId, uint256 amount, string reason, string evidence) external;
}
