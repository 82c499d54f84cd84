/// Constants used throughout the envkey codebase
// Environment variable names
pub const ENVKEY_VAR: &str = "ENVKEY";
pub const DISABLE_AUTOLOAD_VAR: &str = "ENVKEY_DISABLE_AUTOLOAD";
pub const SHOULD_CACHE_VAR: &str = "ENVKEY_SHOULD_CACHE";
pub const SOURCE_DIR_VAR: &str = "ENVKEY_SOURCE_DIR";
pub const SOURCE_VERSION_VAR: &str = "ENVKEY_SOURCE_VERSION";
pub const FETCH_TIMEOUT_VAR: &str = "ENVKEY_FETCH_TIMEOUT";
pub const ENVKEY_LOG_VAR: &str = "ENVKEY_LOG";

// Resolver binary
pub const RESOLVER_NAME: &str = "envkey-source";
pub const DEFAULT_RESOLVER_VERSION: &str = "2.4.1";
pub const DEFAULT_EXT_DIR: &str = "ext";

// Client identification passed to the resolver
pub const CLIENT_NAME: &str = "envkey-rs";

// Resolver command-line flags
pub const FLAG_JSON: &str = "--json";
pub const FLAG_CACHE: &str = "--cache";
pub const FLAG_MEM_CACHE: &str = "--mem-cache";
pub const FLAG_CLIENT_NAME: &str = "--client-name";
pub const FLAG_CLIENT_VERSION: &str = "--client-version";
pub const FLAG_DOTENV_FILE: &str = "--dotenv-file";

// Sentinel prefix the resolver prints when it rejects a credential
pub const ERROR_SENTINEL: &str = "error:";

// Message used when the resolver produced nothing usable
pub const INVALID_KEY_MESSAGE: &str = "ENVKEY invalid. Couldn't load vars.";
