mod ncpa_host;
mod ncpa_port;
mod ncpa_token;
mod ncpa_url;

pub use ncpa_host::NcpaHost;
pub use ncpa_port::NcpaPort;
pub use ncpa_token::NcpaToken;
pub use ncpa_url::{NcpaUrl, build_url};

