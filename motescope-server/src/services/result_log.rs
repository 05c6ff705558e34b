use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::errors::ResultLogError;
use crate::models::Sample;

/// Appends one line per stored sample to a text file.
///
/// Lines read `moteId time temperature humidity light`; a missing reading is
/// written as `-1`.
#[derive(Clone, Debug)]
pub struct ResultLog {
    sender: Option<mpsc::UnboundedSender<String>>,
}

impl ResultLog {
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// Opens `path` for appending and spawns the writer task. The task ends
    /// once every clone of the returned log is dropped.
    pub async fn open(path: impl AsRef<Path>) -> Result<(Self, JoinHandle<()>), ResultLogError> {
        let path: PathBuf = path.as_ref().to_path_buf();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| ResultLogError::Open {
                path: path.clone(),
                source,
            })?;

        tracing::info!("appending results to {:?}", path);

        let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

        let handle = tokio::spawn(async move {
            while let Some(line) = receiver.recv().await {
                let written = async {
                    file.write_all(line.as_bytes()).await?;
                    file.write_all(b"\n").await?;
                    file.flush().await
                }
                .await;

                if let Err(e) = written {
                    tracing::error!("failed to append to result log {:?}: {}", path, e);
                }
            }
        });

        Ok((Self { sender: Some(sender) }, handle))
    }

    pub fn record(&self, sample: &Sample) {
        let line = format_line(sample);
        tracing::info!("{}", line);

        if let Some(sender) = &self.sender {
            if sender.send(line).is_err() {
                tracing::warn!("result log writer has stopped");
            }
        }
    }
}

pub fn format_line(sample: &Sample) -> String {
    let field = |reading: Option<u16>| reading.map_or(-1, i32::from);

    format!(
        "{} {} {} {} {}",
        sample.mote_id,
        sample.logical_time,
        field(sample.temperature),
        field(sample.humidity),
        field(sample.light),
    )
}
