use entities::chain::{Address, ContentReference};
use rand::distributions::Alphanumeric;
use rand::Rng;

pub fn rand_address() -> Address {
    Address::from(rand::thread_rng().gen::<[u8; 20]>())
}

/// Random CIDv0-looking locator
pub fn rand_content_ref() -> ContentReference {
    let hash: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(44)
        .map(char::from)
        .collect();
    format!("Qm{hash}")
}
