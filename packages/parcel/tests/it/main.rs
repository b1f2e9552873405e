pub mod mock;

use clients::{AfterShip, ApiKey};
use url::Url;

/// A legacy API key.
pub const LEGACY_KEY: &str = "legacy-key";

/// A key for the current API generation.
pub const MODERN_KEY: &str = "asat_modern-key";

#[track_caller]
pub fn client(root: &Url, key: &str) -> AfterShip {
    AfterShip::new(root.clone(), ApiKey::new(key)).expect("build AfterShip client")
}
