use crate::crypto::cipher_context::CipherContext;
use crate::crypto::cipher_types::{CipherInput, CipherMode, CipherOutput, Direction};
use crate::crypto::error::{CipherError, Result};
use log::{debug, info, trace, warn};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::thread::available_parallelism;
use tempfile::NamedTempFile;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::task::{JoinError, JoinSet};

const DEFAULT_CHUNK_BLOCKS: usize = 1024;

type ChunkResult = Result<(usize, Vec<u8>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Plaintext chunk length, in cipher blocks.
    pub chunk_blocks: usize,
    /// Upper bound on chunks being processed at the same time.
    pub max_in_flight: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        let workers = available_parallelism().map(|n| n.get()).unwrap_or(4);
        Self {
            chunk_blocks: DEFAULT_CHUNK_BLOCKS,
            max_in_flight: workers * 2,
        }
    }
}

/// Holds finished chunks until every chunk before them has been written.
struct ReorderBuffer<W> {
    writer: W,
    pending: BTreeMap<usize, Vec<u8>>,
    next_index: usize,
}

impl<W: AsyncWrite + Unpin> ReorderBuffer<W> {
    fn new(writer: W) -> Self {
        Self {
            writer,
            pending: BTreeMap::new(),
            next_index: 0,
        }
    }

    async fn push(&mut self, index: usize, data: Vec<u8>) -> Result<()> {
        self.pending.insert(index, data);
        while let Some(data) = self.pending.remove(&self.next_index) {
            self.writer.write_all(&data).await?;
            self.next_index += 1;
        }
        Ok(())
    }

    /// Finished chunks waiting on an earlier one.
    fn backlog(&self) -> usize {
        self.pending.len()
    }

    async fn finish(mut self) -> Result<W> {
        debug_assert!(self.pending.is_empty(), "chunks left behind a gap");
        self.writer.flush().await?;
        Ok(self.writer)
    }
}

/// Encrypts or decrypts large inputs chunk by chunk on the blocking pool.
///
/// Chaining modes restart from the configured IV at each chunk boundary,
/// while CTR starts chunk `k` at `IV + k * chunk_blocks` so the whole stream
/// matches a single CTR pass. Only the final chunk is padded or unpadded:
/// every earlier chunk is exactly `chunk_blocks` blocks in both directions.
/// Output is written in input order whatever order the workers finish in.
pub struct StreamProcessor {
    context: Arc<CipherContext>,
    config: StreamConfig,
}

impl StreamProcessor {
    pub fn new(context: Arc<CipherContext>) -> Self {
        Self {
            context,
            config: StreamConfig::default(),
        }
    }

    pub fn with_config(context: Arc<CipherContext>, config: StreamConfig) -> Result<Self> {
        if config.chunk_blocks == 0 || config.max_in_flight == 0 {
            return Err(CipherError::InvalidArgument(format!(
                "stream config needs non-zero chunk_blocks and max_in_flight, got {config:?}"
            )));
        }
        Ok(Self { context, config })
    }

    pub fn context(&self) -> &Arc<CipherContext> {
        &self.context
    }

    pub fn config(&self) -> StreamConfig {
        self.config
    }

    pub async fn encrypt_file(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
        self.process_file(input.as_ref(), output.as_ref(), Direction::Encrypt)
            .await
    }

    pub async fn decrypt_file(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
        self.process_file(input.as_ref(), output.as_ref(), Direction::Decrypt)
            .await
    }

    /// Byte inputs are handled as one message; file inputs go through the
    /// chunked pipeline. Nothing is written to `output` unless the whole run
    /// succeeds.
    pub async fn run(
        &self,
        input: CipherInput,
        output: &mut CipherOutput,
        direction: Direction,
    ) -> Result<()> {
        match (input, output) {
            (CipherInput::File(input_path), CipherOutput::File(output_path)) => {
                self.process_file(&input_path, output_path, direction).await
            }
            (CipherInput::File(input_path), CipherOutput::Buffer(buf)) => {
                let reader = BufReader::new(File::open(&input_path).await?);
                **buf = self.process(reader, Vec::new(), direction).await?;
                Ok(())
            }
            (CipherInput::Bytes(data), CipherOutput::Buffer(buf)) => {
                **buf = self.process_message(data, direction).await?;
                Ok(())
            }
            (CipherInput::Bytes(data), CipherOutput::File(output_path)) => {
                let result = self.process_message(data, direction).await?;
                let staged = stage_output(output_path)?;
                let mut writer = File::from_std(staged.as_file().try_clone()?);
                writer.write_all(&result).await?;
                writer.flush().await?;
                drop(writer);
                commit_output(staged, output_path)
            }
        }
    }

    /// Core pipeline: reads chunks from `reader`, fans them out to workers and
    /// writes results to `writer` in order, returning the flushed writer.
    ///
    /// On error the writer may already hold a prefix of the output; the file
    /// and [`StreamProcessor::run`] entry points discard it.
    pub async fn process<R, W>(&self, mut reader: R, writer: W, direction: Direction) -> Result<W>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let chunk_len = self.context.block_size() * self.config.chunk_blocks;
        let mut workers: JoinSet<ChunkResult> = JoinSet::new();
        let mut output = ReorderBuffer::new(writer);
        let mut first_error: Option<CipherError> = None;
        let mut index = 0;

        debug!(
            "{:?} pipeline: {}-byte chunks, {} in flight",
            direction, chunk_len, self.config.max_in_flight
        );

        let mut chunk = match read_chunk(&mut reader, chunk_len).await {
            Ok(chunk) => Some(chunk),
            Err(e) => {
                first_error = Some(e.into());
                None
            }
        };

        'submit: while let Some(current) = chunk.take() {
            while let Some(joined) = workers.try_join_next() {
                if let Err(e) = collect(joined, &mut output).await {
                    first_error = Some(e);
                    break 'submit;
                }
            }
            // Chunks parked in the reorder buffer count against the limit.
            while workers.len() + output.backlog() >= self.config.max_in_flight {
                let Some(joined) = workers.join_next().await else {
                    break;
                };
                if let Err(e) = collect(joined, &mut output).await {
                    first_error = Some(e);
                    break 'submit;
                }
            }

            // A short chunk is the last one; a full one needs a look ahead.
            let following = if current.len() < chunk_len {
                None
            } else {
                match read_chunk(&mut reader, chunk_len).await {
                    Ok(next) => Some(next),
                    Err(e) => {
                        first_error = Some(e.into());
                        break;
                    }
                }
            };
            // Encryption always ends on a short (possibly empty) chunk so the
            // padding lands in it; ciphertext ends on its last non-empty chunk.
            let is_final = match direction {
                Direction::Encrypt => following.is_none(),
                Direction::Decrypt => following.as_ref().is_none_or(|next| next.is_empty()),
            };

            let context = Arc::clone(&self.context);
            let iv = self.chunk_iv(index);
            let chunk_index = index;
            workers.spawn_blocking(move || {
                let iv = iv.as_deref();
                let processed = match (direction, is_final) {
                    (Direction::Encrypt, true) => context.encrypt_with_iv(&current, iv),
                    (Direction::Encrypt, false) => context.encrypt_unpadded(&current, iv),
                    (Direction::Decrypt, true) => context.decrypt_with_iv(&current, iv),
                    (Direction::Decrypt, false) => context.decrypt_unpadded(&current, iv),
                }?;
                Ok((chunk_index, processed))
            });
            index += 1;

            if !is_final {
                chunk = following;
            }
        }

        // Submitted work runs to completion; after a failure its output is dropped.
        while let Some(joined) = workers.join_next().await {
            if first_error.is_some() {
                continue;
            }
            if let Err(e) = collect(joined, &mut output).await {
                first_error = Some(e);
            }
        }

        if let Some(e) = first_error {
            warn!("{:?} pipeline aborted after {} chunks: {}", direction, index, e);
            return Err(e);
        }

        let writer = output.finish().await?;
        info!("{:?} pipeline finished, {} chunks", direction, index);
        Ok(writer)
    }

    async fn process_file(&self, input: &Path, output: &Path, direction: Direction) -> Result<()> {
        info!("{:?} {} -> {}", direction, input.display(), output.display());

        let reader = BufReader::new(File::open(input).await?);
        let staged = stage_output(output)?;
        let writer = BufWriter::new(File::from_std(staged.as_file().try_clone()?));

        self.process(reader, writer, direction).await?;
        commit_output(staged, output)
    }

    async fn process_message(&self, data: Vec<u8>, direction: Direction) -> Result<Vec<u8>> {
        let context = Arc::clone(&self.context);
        tokio::task::spawn_blocking(move || match direction {
            Direction::Encrypt => context.encrypt(&data),
            Direction::Decrypt => context.decrypt(&data),
        })
        .await
        .map_err(|e| CipherError::Worker(e.to_string()))?
    }

    fn chunk_iv(&self, index: usize) -> Option<Vec<u8>> {
        let mut iv = self.context.iv()?.to_vec();
        if self.context.mode() == CipherMode::CTR {
            CipherContext::increment_block(&mut iv, index * self.config.chunk_blocks);
        }
        Some(iv)
    }
}

async fn collect<W: AsyncWrite + Unpin>(
    joined: std::result::Result<ChunkResult, JoinError>,
    output: &mut ReorderBuffer<W>,
) -> Result<()> {
    let (index, data) = joined.map_err(|e| CipherError::Worker(e.to_string()))??;
    trace!("chunk {} done, {} bytes", index, data.len());
    output.push(index, data).await
}

// Fills up to `len` bytes; fewer only at end of input.
async fn read_chunk<R: AsyncRead + Unpin>(reader: &mut R, len: usize) -> std::io::Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buf.truncate(filled);
    Ok(buf)
}

// Output is staged next to its destination so the final rename stays on one
// filesystem.
fn stage_output(output: &Path) -> Result<NamedTempFile> {
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok(NamedTempFile::new_in(dir)?)
}

fn commit_output(staged: NamedTempFile, output: &Path) -> Result<()> {
    staged.persist(output).map_err(|e| e.error)?;
    Ok(())
}
