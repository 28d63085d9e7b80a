//! Single-pass streaming zip writer.

use async_zip::tokio::write::ZipFileWriter;
use async_zip::{Compression, DeflateOption, ZipDateTime, ZipDateTimeBuilder, ZipEntryBuilder};
#[cfg(feature = "config")]
use clap::ValueEnum;
use jiff::Zoned;
use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, IntoStaticStr};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{ArchiveError, ArchiveResult};
use crate::utility::tracing_targets::ARCHIVE_WRITER as TRACING_TARGET;

/// Deflate effort used for every entry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, Display, AsRefStr)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CompressionLevel {
    /// Lowest CPU cost.
    Fastest,
    /// Balanced.
    Default,
    /// Smallest output.
    #[default]
    Best,
}

impl CompressionLevel {
    fn deflate_option(self) -> DeflateOption {
        match self {
            Self::Fastest => DeflateOption::Fast,
            Self::Default => DeflateOption::Normal,
            Self::Best => DeflateOption::Maximum,
        }
    }
}

/// Lifecycle of an [`ArchiveWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum WriterState {
    /// Accepting entries.
    Open,
    /// Central directory written and sink shut down.
    Finalized,
    /// Dropped without a central directory.
    Aborted,
}

/// Zip writer that emits each entry as soon as it is appended.
///
/// Only the central directory, which grows with the entry count, is
/// held back until [`finalize`](Self::finalize).
pub struct ArchiveWriter<W: AsyncWrite + Unpin> {
    inner: Option<ZipFileWriter<W>>,
    level: CompressionLevel,
    entries: usize,
    state: WriterState,
}

impl<W> ArchiveWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Starts a new archive over `sink`.
    pub fn new(sink: W, level: CompressionLevel) -> Self {
        Self {
            inner: Some(ZipFileWriter::with_tokio(sink)),
            level,
            entries: 0,
            state: WriterState::Open,
        }
    }

    /// Returns the current state.
    #[inline]
    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Returns the number of entries written.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Compresses `data` and writes it as one entry named `name`.
    pub async fn append(&mut self, name: &str, data: &[u8]) -> ArchiveResult<()> {
        let entry = ZipEntryBuilder::new(name.to_owned().into(), Compression::Deflate)
            .deflate_option(self.level.deflate_option())
            .last_modification_date(modification_time());
        let writer = self.open_writer()?;

        if let Err(err) = writer.write_entry_whole(entry, data).await {
            tracing::error!(target: TRACING_TARGET, entry = name, error = %err, "failed to write entry");
            self.abort("entry write failed");
            return Err(err.into());
        }

        self.entries += 1;
        tracing::trace!(target: TRACING_TARGET, entry = name, size = data.len(), "entry written");
        Ok(())
    }

    /// Writes the central directory and shuts the sink down.
    ///
    /// Returns the number of entries in the archive.
    pub async fn finalize(&mut self) -> ArchiveResult<usize> {
        let Some(writer) = self.inner.take() else {
            return Err(ArchiveError::WriterClosed(self.state.into()));
        };

        self.state = WriterState::Aborted;
        let mut sink = writer.close().await?.into_inner();
        sink.shutdown().await?;

        self.state = WriterState::Finalized;
        tracing::debug!(target: TRACING_TARGET, entries = self.entries, "archive finalized");
        Ok(self.entries)
    }

    /// Drops the archive without a central directory.
    ///
    /// Returns `false` if the writer was already finalized or aborted.
    pub fn abort(&mut self, reason: &str) -> bool {
        if self.inner.take().is_none() {
            return false;
        }

        self.state = WriterState::Aborted;
        tracing::warn!(target: TRACING_TARGET, reason, entries = self.entries, "archive aborted");
        true
    }

    fn open_writer(&mut self) -> ArchiveResult<&mut ZipFileWriter<W>> {
        match self.inner.as_mut() {
            Some(writer) => Ok(writer),
            None => Err(ArchiveError::WriterClosed(self.state.into())),
        }
    }
}

/// Current UTC time in zip (DOS) resolution.
fn modification_time() -> ZipDateTime {
    let now = Zoned::now().with_time_zone(TimeZone::UTC);
    ZipDateTimeBuilder::new()
        .year(i32::from(now.year()))
        .month(u32::from(now.month().unsigned_abs()))
        .day(u32::from(now.day().unsigned_abs()))
        .hour(u32::from(now.hour().unsigned_abs()))
        .minute(u32::from(now.minute().unsigned_abs()))
        .second(u32::from(now.second().unsigned_abs()))
        .build()
}

#[cfg(test)]
pub(crate) mod tests {
    use async_zip::base::read::mem::ZipFileReader;

    use super::*;

    /// Reads back every entry of a finished archive as `(name, contents)`.
    pub(crate) async fn read_entries(archive: Vec<u8>) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
        let reader = ZipFileReader::new(archive).await?;
        let mut entries = Vec::new();
        for index in 0..reader.file().entries().len() {
            let name = reader.file().entries()[index].filename().as_str()?.to_owned();
            let mut contents = Vec::new();
            reader
                .reader_with_entry(index)
                .await?
                .read_to_end_checked(&mut contents)
                .await?;
            entries.push((name, contents));
        }
        Ok(entries)
    }

    #[tokio::test]
    async fn writes_entries_in_order() -> anyhow::Result<()> {
        let (client, mut reader) = tokio::io::duplex(64 * 1024);
        let mut writer = ArchiveWriter::new(client, CompressionLevel::Fastest);
        writer.append("Ada/1.jpg", b"first").await?;
        writer.append("Ada/2.jpg", b"second").await?;
        assert_eq!(writer.entries(), 2);
        assert_eq!(writer.finalize().await?, 2);
        assert_eq!(writer.state(), WriterState::Finalized);

        let mut archive = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut archive).await?;
        let entries = read_entries(archive).await?;
        assert_eq!(
            entries,
            vec![
                ("Ada/1.jpg".to_owned(), b"first".to_vec()),
                ("Ada/2.jpg".to_owned(), b"second".to_vec()),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn empty_archive_is_valid() -> anyhow::Result<()> {
        let (client, mut server) = tokio::io::duplex(1024);
        let mut writer = ArchiveWriter::new(client, CompressionLevel::Default);
        assert_eq!(writer.finalize().await?, 0);

        let mut archive = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut server, &mut archive).await?;
        assert!(read_entries(archive).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn abort_closes_the_writer() -> anyhow::Result<()> {
        let (client, mut server) = tokio::io::duplex(64 * 1024);
        let mut writer = ArchiveWriter::new(client, CompressionLevel::Best);
        writer.append("Ada/1.jpg", b"first").await?;

        assert!(writer.abort("client disconnected"));
        assert!(!writer.abort("again"));
        assert_eq!(writer.state(), WriterState::Aborted);
        assert!(matches!(
            writer.append("Ada/2.jpg", b"second").await,
            Err(ArchiveError::WriterClosed(_))
        ));
        assert!(writer.finalize().await.is_err());
        drop(writer);

        let mut archive = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut server, &mut archive).await?;
        assert!(archive.starts_with(b"PK\x03\x04"));
        assert!(ZipFileReader::new(archive).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn finalize_twice_fails() -> anyhow::Result<()> {
        let mut writer = ArchiveWriter::new(Vec::new(), CompressionLevel::Best);
        writer.finalize().await?;
        assert!(matches!(
            writer.finalize().await,
            Err(ArchiveError::WriterClosed("finalized"))
        ));
        assert!(!writer.abort("late"));
        Ok(())
    }

    #[tokio::test]
    async fn closed_sink_fails_append() -> anyhow::Result<()> {
        let (client, server) = tokio::io::duplex(16);
        drop(server);

        let mut writer = ArchiveWriter::new(client, CompressionLevel::Best);
        let result = writer.append("Ada/1.jpg", &[7_u8; 4096]).await;
        assert!(result.is_err());
        assert_eq!(writer.state(), WriterState::Aborted);
        Ok(())
    }
}
