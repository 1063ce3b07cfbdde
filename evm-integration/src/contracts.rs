//! Bindings of the two registry contracts, generated from human-readable ABI.
use ethers::middleware::SignerMiddleware;
use ethers::prelude::abigen;
use ethers::providers::{Http, Provider};
use ethers::signers::LocalWallet;

/// Provider with the session identity as the transaction signer
pub type EvmClient = SignerMiddleware<Provider<Http>, LocalWallet>;

abigen!(
    AssetRegistryContract,
    r#"[
        function tokenURI(uint256 tokenId) external view returns (string)
        function tokensOfOwner(address owner) external view returns (uint256[])
    ]"#
);

abigen!(
    MarketplaceContract,
    r#"[
        function getListedTokenIds() external view returns (uint256[])
        function listings(uint256 tokenId) external view returns (address seller, uint256 price)
        function buyToken(uint256 tokenId) external payable
    ]"#
);
