use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ResultLogError {
    #[error("Fail to open file [{path:?}]")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
