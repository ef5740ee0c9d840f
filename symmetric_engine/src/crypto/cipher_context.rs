use std::io;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use rand::rngs::OsRng;
use rand::TryRngCore;
use rayon::prelude::*;

use crate::crypto::cancellation::CancellationToken;
use crate::crypto::cipher_traits::BlockCipher;
use crate::crypto::cipher_types::{CipherContextConfig, CipherMode, PaddingMode};
use crate::crypto::errors::CipherError;
use crate::crypto::padding::{apply_padding, remove_padding};

/// Upper bound of the per-call worker pool for the parallelizable modes.
pub const MAX_WORKERS: usize = 8;

/// Binds a keyed block cipher to a mode of operation and a padding scheme,
/// turning it into an arbitrary-length byte and file transform.
///
/// ECB, CTR and CBC decryption fan their blocks out over a bounded worker
/// pool; the chained modes run strictly sequentially. Every path polls the
/// caller's [`CancellationToken`] at the start and at each block boundary,
/// and a cancelled operation discards its partial output.
#[derive(Clone)]
pub struct CipherContext {
    cipher: Arc<dyn BlockCipher + Send + Sync>,
    mode: CipherMode,
    padding: PaddingMode,
    iv: Option<Vec<u8>>,
    block_size: usize,
    max_workers: usize,
}

impl CipherContext {
    pub fn new(
        mut cipher: Box<dyn BlockCipher + Send + Sync>,
        config: CipherContextConfig,
    ) -> Result<Self, CipherError> {
        cipher.set_key(&config.key)?;
        let block_size = cipher.block_size();

        let iv = match config.iv {
            Some(iv) => {
                if iv.len() != block_size {
                    return Err(CipherError::Validation(format!(
                        "new: IV length must equal the block size ({block_size} bytes)"
                    )));
                }
                Some(iv)
            }
            None if config.mode.requires_iv() => Some(random_block(block_size)?),
            None => None,
        };

        Ok(CipherContext {
            cipher: Arc::from(cipher),
            mode: config.mode,
            padding: config.padding,
            iv,
            block_size,
            max_workers: MAX_WORKERS,
        })
    }

    /// Caps the worker pool of the parallel modes. Output is byte-identical
    /// for any cap; used by tests to pin the pool at one worker.
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers.max(1);
        self
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn iv(&self) -> Option<&[u8]> {
        self.iv.as_deref()
    }

    pub async fn encrypt_bytes(
        &self,
        token: &CancellationToken,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        self.run(token, plaintext.to_vec(), true).await
    }

    pub async fn decrypt_bytes(
        &self,
        token: &CancellationToken,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        self.run(token, ciphertext.to_vec(), false).await
    }

    pub async fn encrypt_file(
        &self,
        token: &CancellationToken,
        input_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> Result<(), CipherError> {
        self.process_file(token, input_path.as_ref(), output_path.as_ref(), true)
            .await
    }

    pub async fn decrypt_file(
        &self,
        token: &CancellationToken,
        input_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> Result<(), CipherError> {
        self.process_file(token, input_path.as_ref(), output_path.as_ref(), false)
            .await
    }

    // Whole files are read into memory, transformed as one buffer and written
    // back out; there is no incremental streaming.
    async fn process_file(
        &self,
        token: &CancellationToken,
        input_path: &Path,
        output_path: &Path,
        encrypt: bool,
    ) -> Result<(), CipherError> {
        if token.is_cancelled() {
            return Err(CipherError::Cancelled);
        }

        let data = tokio::fs::read(input_path).await?;
        debug!(
            "{} {} bytes from {}",
            if encrypt { "encrypting" } else { "decrypting" },
            data.len(),
            input_path.display()
        );

        let transformed = self.run(token, data, encrypt).await?;
        tokio::fs::write(output_path, transformed).await?;
        Ok(())
    }

    // Races the block loop (on the blocking pool) against cancellation; the
    // loop itself polls the same token, giving two cooperating checkpoints.
    async fn run(
        &self,
        token: &CancellationToken,
        data: Vec<u8>,
        encrypt: bool,
    ) -> Result<Vec<u8>, CipherError> {
        let this = self.clone();
        let inner_token = token.clone();
        let task = tokio::task::spawn_blocking(move || {
            if encrypt {
                this.encrypt_inner(&inner_token, &data)
            } else {
                this.decrypt_inner(&inner_token, &data)
            }
        });

        tokio::select! {
            joined = task => {
                joined.map_err(|e| CipherError::Io(io::Error::other(e)))?
            }
            _ = token.cancelled() => Err(CipherError::Cancelled),
        }
    }

    fn encrypt_inner(
        &self,
        token: &CancellationToken,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        if token.is_cancelled() {
            return Err(CipherError::Cancelled);
        }

        let padded = apply_padding(plaintext, self.block_size, self.padding)?;
        debug!(
            "encrypt: {} bytes ({} padded), mode {:?}, padding {:?}",
            plaintext.len(),
            padded.len(),
            self.mode,
            self.padding
        );

        match self.mode {
            CipherMode::ECB => self.process_ecb(token, &padded, true),
            CipherMode::CBC => self.encrypt_cbc(token, &padded),
            CipherMode::PCBC => self.encrypt_pcbc(token, &padded),
            CipherMode::CFB => self.process_cfb(token, &padded, true),
            CipherMode::OFB => self.process_ofb(token, &padded),
            CipherMode::CTR => self.process_ctr(token, &padded),
            CipherMode::RandomDelta => self.encrypt_random_delta(token, &padded),
        }
    }

    fn decrypt_inner(
        &self,
        token: &CancellationToken,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        if token.is_cancelled() {
            return Err(CipherError::Cancelled);
        }

        let plain = match self.mode {
            CipherMode::ECB => self.process_ecb(token, ciphertext, false)?,
            CipherMode::CBC => self.decrypt_cbc(token, ciphertext)?,
            CipherMode::PCBC => self.decrypt_pcbc(token, ciphertext)?,
            CipherMode::CFB => self.process_cfb(token, ciphertext, false)?,
            CipherMode::OFB => self.process_ofb(token, ciphertext)?,
            CipherMode::CTR => self.process_ctr(token, ciphertext)?,
            CipherMode::RandomDelta => self.decrypt_random_delta(token, ciphertext)?,
        };

        remove_padding(&plain, self.block_size, self.padding)
    }

    fn iv_or_zero(&self) -> Vec<u8> {
        self.iv.clone().unwrap_or_else(|| vec![0u8; self.block_size])
    }

    fn check_aligned(&self, len: usize, op: &str) -> Result<(), CipherError> {
        if len % self.block_size != 0 {
            return Err(CipherError::Validation(format!(
                "{op}: data length must be a multiple of the block size"
            )));
        }
        Ok(())
    }

    // Structured parallel-for over disjoint contiguous spans of the output.
    // At most min(block count, max_workers) spans run concurrently and each
    // span owns its own output slice, so the workers share nothing mutable.
    fn for_each_block_parallel<F>(
        &self,
        token: &CancellationToken,
        out: &mut [u8],
        op: F,
    ) -> Result<(), CipherError>
    where
        F: Fn(usize, &mut [u8]) -> Result<(), CipherError> + Sync,
    {
        let block_size = self.block_size;
        let num_blocks = (out.len() + block_size - 1) / block_size;
        if num_blocks == 0 {
            return Ok(());
        }

        let workers = num_blocks.min(self.max_workers);
        let span_blocks = (num_blocks + workers - 1) / workers;

        out.par_chunks_mut(span_blocks * block_size)
            .enumerate()
            .try_for_each(|(span_index, span)| {
                let first_block = span_index * span_blocks;
                for (offset, dst) in span.chunks_mut(block_size).enumerate() {
                    if token.is_cancelled() {
                        return Err(CipherError::Cancelled);
                    }
                    op(first_block + offset, dst)?;
                }
                Ok(())
            })
    }

    fn process_ecb(
        &self,
        token: &CancellationToken,
        data: &[u8],
        encrypt: bool,
    ) -> Result<Vec<u8>, CipherError> {
        self.check_aligned(data.len(), "ECB")?;

        let block_size = self.block_size;
        let mut out = vec![0u8; data.len()];
        self.for_each_block_parallel(token, &mut out, |i, dst| {
            let block = &data[i * block_size..(i + 1) * block_size];
            let processed = if encrypt {
                self.cipher.encrypt(block)?
            } else {
                self.cipher.decrypt(block)?
            };
            copy_block(dst, &processed, "ECB")
        })?;
        Ok(out)
    }

    fn encrypt_cbc(
        &self,
        token: &CancellationToken,
        data: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        self.check_aligned(data.len(), "CBC")?;

        let mut out = Vec::with_capacity(data.len());
        let mut prev = self.iv_or_zero();
        for chunk in data.chunks(self.block_size) {
            if token.is_cancelled() {
                return Err(CipherError::Cancelled);
            }
            let mixed = xor_blocks(chunk, &prev);
            let encrypted = self.cipher.encrypt(&mixed)?;
            out.extend_from_slice(&encrypted);
            prev = encrypted;
        }
        Ok(out)
    }

    // Each ciphertext block depends only on its predecessor, so decryption
    // parallelizes even though encryption cannot.
    fn decrypt_cbc(
        &self,
        token: &CancellationToken,
        data: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        self.check_aligned(data.len(), "CBC")?;

        let block_size = self.block_size;
        let iv = self.iv_or_zero();
        let mut out = vec![0u8; data.len()];
        self.for_each_block_parallel(token, &mut out, |i, dst| {
            let block = &data[i * block_size..(i + 1) * block_size];
            let decrypted = self.cipher.decrypt(block)?;
            let prev = if i == 0 {
                &iv[..]
            } else {
                &data[(i - 1) * block_size..i * block_size]
            };
            copy_block(dst, &xor_blocks(&decrypted, prev), "CBC")
        })?;
        Ok(out)
    }

    fn encrypt_pcbc(
        &self,
        token: &CancellationToken,
        data: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        self.check_aligned(data.len(), "PCBC")?;

        let mut out = Vec::with_capacity(data.len());
        let mut prev = self.iv_or_zero(); // carries P_{i-1} xor C_{i-1}
        for chunk in data.chunks(self.block_size) {
            if token.is_cancelled() {
                return Err(CipherError::Cancelled);
            }
            let mixed = xor_blocks(chunk, &prev);
            let encrypted = self.cipher.encrypt(&mixed)?;
            prev = xor_blocks(chunk, &encrypted);
            out.extend_from_slice(&encrypted);
        }
        Ok(out)
    }

    fn decrypt_pcbc(
        &self,
        token: &CancellationToken,
        data: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        self.check_aligned(data.len(), "PCBC")?;

        let mut out = Vec::with_capacity(data.len());
        let mut prev = self.iv_or_zero();
        for chunk in data.chunks(self.block_size) {
            if token.is_cancelled() {
                return Err(CipherError::Cancelled);
            }
            let decrypted = self.cipher.decrypt(chunk)?;
            let plain = xor_blocks(&decrypted, &prev);
            prev = xor_blocks(&plain, chunk);
            out.extend_from_slice(&plain);
        }
        Ok(out)
    }

    // Keystream from encrypting the feedback register, which is reloaded with
    // the ciphertext each step; a short tail keeps the keystream remainder.
    fn process_cfb(
        &self,
        token: &CancellationToken,
        data: &[u8],
        encrypt: bool,
    ) -> Result<Vec<u8>, CipherError> {
        let block_size = self.block_size;
        let mut out = Vec::with_capacity(data.len());
        let mut feedback = self.iv_or_zero();

        let mut offset = 0;
        while offset < data.len() {
            if token.is_cancelled() {
                return Err(CipherError::Cancelled);
            }
            let keystream = self.cipher.encrypt(&feedback)?;
            check_keystream(&keystream, block_size)?;
            let n = block_size.min(data.len() - offset);
            let processed = xor_blocks(&data[offset..offset + n], &keystream);

            let cipher_part: &[u8] = if encrypt {
                &processed
            } else {
                &data[offset..offset + n]
            };
            feedback[..n].copy_from_slice(cipher_part);
            if n < block_size {
                feedback[n..].copy_from_slice(&keystream[n..block_size]);
            }

            out.extend_from_slice(&processed);
            offset += n;
        }
        Ok(out)
    }

    // Same keystream on both sides: Enc(Enc(...Enc(IV))).
    fn process_ofb(
        &self,
        token: &CancellationToken,
        data: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        let block_size = self.block_size;
        let mut out = Vec::with_capacity(data.len());
        let mut feedback = self.iv_or_zero();

        let mut offset = 0;
        while offset < data.len() {
            if token.is_cancelled() {
                return Err(CipherError::Cancelled);
            }
            let keystream = self.cipher.encrypt(&feedback)?;
            check_keystream(&keystream, block_size)?;
            let n = block_size.min(data.len() - offset);
            out.extend_from_slice(&xor_blocks(&data[offset..offset + n], &keystream));
            feedback.copy_from_slice(&keystream[..block_size]);
            offset += n;
        }
        Ok(out)
    }

    fn process_ctr(
        &self,
        token: &CancellationToken,
        data: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        let block_size = self.block_size;
        let iv = self.iv_or_zero();
        let mut out = vec![0u8; data.len()];
        self.for_each_block_parallel(token, &mut out, |i, dst| {
            let mut counter = iv.clone();
            increment_counter(&mut counter, i);
            let keystream = self.cipher.encrypt(&counter)?;
            check_keystream(&keystream, dst.len())?;
            let start = i * block_size;
            for (j, slot) in dst.iter_mut().enumerate() {
                *slot = data[start + j] ^ keystream[j];
            }
            Ok(())
        })?;
        Ok(out)
    }

    // Every block gets a fresh random delta which rides along in the
    // ciphertext, doubling its size.
    fn encrypt_random_delta(
        &self,
        token: &CancellationToken,
        data: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        self.check_aligned(data.len(), "RandomDelta")?;

        let mut out = Vec::with_capacity(data.len() * 2);
        for chunk in data.chunks(self.block_size) {
            if token.is_cancelled() {
                return Err(CipherError::Cancelled);
            }
            let delta = random_block(self.block_size)?;
            let encrypted = self.cipher.encrypt(&xor_blocks(chunk, &delta))?;
            out.extend_from_slice(&encrypted);
            out.extend_from_slice(&delta);
        }
        Ok(out)
    }

    fn decrypt_random_delta(
        &self,
        token: &CancellationToken,
        data: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        if data.len() % (self.block_size * 2) != 0 {
            return Err(CipherError::Validation(
                "RandomDelta: ciphertext length must be a multiple of twice the block size"
                    .into(),
            ));
        }

        let mut out = Vec::with_capacity(data.len() / 2);
        for pair in data.chunks(self.block_size * 2) {
            if token.is_cancelled() {
                return Err(CipherError::Cancelled);
            }
            let (encrypted, delta) = pair.split_at(self.block_size);
            let decrypted = self.cipher.decrypt(encrypted)?;
            out.extend_from_slice(&xor_blocks(&decrypted, delta));
        }
        Ok(out)
    }
}

fn xor_blocks(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b.iter()).map(|(&x, &y)| x ^ y).collect()
}

fn check_keystream(keystream: &[u8], needed: usize) -> Result<(), CipherError> {
    if keystream.len() < needed {
        return Err(CipherError::Validation(
            "keystream: cipher returned a short block".into(),
        ));
    }
    Ok(())
}

fn copy_block(dst: &mut [u8], src: &[u8], op: &str) -> Result<(), CipherError> {
    if src.len() != dst.len() {
        return Err(CipherError::Validation(format!(
            "{op}: cipher returned {} bytes for a {} byte block",
            src.len(),
            dst.len()
        )));
    }
    dst.copy_from_slice(src);
    Ok(())
}

// Big-endian add of the block index onto a copy of the IV.
fn increment_counter(counter: &mut [u8], value: usize) {
    let mut carry = value;
    for byte in counter.iter_mut().rev() {
        if carry == 0 {
            break;
        }
        let sum = *byte as usize + carry;
        *byte = (sum % 256) as u8;
        carry = sum / 256;
    }
}

fn random_block(len: usize) -> Result<Vec<u8>, CipherError> {
    let mut block = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut block)
        .map_err(|e| CipherError::Io(io::Error::other(e)))?;
    Ok(block)
}
