use ethers::contract::abigen;

abigen!(
    UserIdentity,
    r#"[
        function getPatientIdBySSN(string ssn) external view returns (string)
        function getSSN(string patientId) external view returns (string)
        function isPatientIdAssigned(string patientId) external view returns (bool)
        function generatePatientId(uint256 randomNumber) external returns (string)
        function storeDataHash(string patientId, string dataHash) external
        function storeSSN(string patientId, string ssn) external
        event PatientIdAssigned(address indexed user, string patientId)
    ]"#
);

abigen!(
    ConsentManagement,
    r#"[
        function createConsents(string patientId, bytes32[18] consentHashes, string[18] offChainDataLinks, string ssn) external
    ]"#
);
