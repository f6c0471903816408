use super::{chunk_len, ByteSource, ChunkMap};
use crate::config::MB_SIZE;
use crate::errors::{FrameExtractorError, FrameExtractorResult, StreamError};
use log::{info, warn};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{CONTENT_LENGTH, RANGE};
use reqwest::StatusCode;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote file served over HTTP(S) range requests
pub struct HttpByteSource {
    url: String,
    client: Client,
    length: u64,
    http_request_count: u64,
    http_request_bytes_read: u64,
}

impl HttpByteSource {
    /// Connect to `url` and learn its length with a HEAD request.
    pub fn new(url: impl Into<String>) -> FrameExtractorResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StreamError::new(format!("cannot build HTTP client: {}", e)))?;

        let mut source = Self {
            url: url.into(),
            client,
            length: 0,
            http_request_count: 0,
            http_request_bytes_read: 0,
        };
        source.length = source.content_length()?;
        Ok(source)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// HEAD and GET requests issued so far.
    pub fn http_request_count(&self) -> u64 {
        self.http_request_count
    }

    /// Body bytes kept from ranged responses.
    pub fn http_request_bytes_read(&self) -> u64 {
        self.http_request_bytes_read
    }

    fn send(&mut self, request: RequestBuilder) -> FrameExtractorResult<Response> {
        let response = request
            .send()
            .map_err(|e| StreamError::new(format!("request to {} failed: {}", self.url, e)))?;
        self.http_request_count += 1;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::new(format!("HTTP {} for {}", status, self.url)).into());
        }
        Ok(response)
    }

    fn content_length(&mut self) -> FrameExtractorResult<u64> {
        let request = self.client.head(&self.url);
        let response = self.send(request)?;
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| {
                FrameExtractorError::Stream(StreamError::new(format!(
                    "{} did not report a valid Content-Length",
                    self.url
                )))
            })
    }

    fn get_byte_range(&mut self, range_from: u64, count: u64) -> FrameExtractorResult<Vec<u8>> {
        let range = format!("bytes={}-{}", range_from, range_from + count - 1);
        let request = self.client.get(&self.url).header(RANGE, range);
        let response = self.send(request)?;
        let status = response.status();
        let bytes = response
            .bytes()
            .map_err(|e| StreamError::new(format!("reading range body failed: {}", e)))?;

        let data = match status {
            StatusCode::PARTIAL_CONTENT => &bytes[..],
            // server ignored the range and sent the whole file
            StatusCode::OK => {
                warn!("{} ignores range requests, slicing the full body", self.url);
                let end = (range_from + count).min(bytes.len() as u64) as usize;
                bytes.get(range_from as usize..end).unwrap_or_default()
            }
            other => {
                return Err(StreamError::new(format!(
                    "unexpected HTTP {} for a range request to {}",
                    other, self.url
                ))
                .into())
            }
        };

        if data.len() as u64 != count {
            return Err(StreamError::new(format!(
                "range response mismatch: asked {} bytes at offset {}, got {}",
                count,
                range_from,
                data.len()
            ))
            .into());
        }

        self.http_request_bytes_read += count;
        Ok(data.to_vec())
    }
}

impl ByteSource for HttpByteSource {
    fn size(&self) -> u64 {
        self.length
    }

    fn fetch_chunks(
        &mut self,
        offset: u64,
        count: u32,
        chunk_size: u32,
    ) -> FrameExtractorResult<ChunkMap> {
        let lens: Vec<usize> = (0..count as u64)
            .map(|i| chunk_len(self.length, offset + i * chunk_size as u64, chunk_size))
            .collect();
        if lens.iter().any(|&len| len == 0) {
            return Err(FrameExtractorError::Stream(StreamError::new(format!(
                "{} chunks at offset {} reach beyond the end of {}",
                count, offset, self.url
            ))));
        }

        let total: u64 = lens.iter().map(|&len| len as u64).sum();
        let data = self.get_byte_range(offset, total)?;

        let mut chunks = ChunkMap::with_capacity(count as usize);
        let mut pos = 0usize;
        for (i, len) in lens.into_iter().enumerate() {
            chunks.insert(
                offset + i as u64 * chunk_size as u64,
                data[pos..pos + len].to_vec(),
            );
            pos += len;
        }
        Ok(chunks)
    }

    fn describe(&self) -> String {
        format!("remote file {} ({} bytes)", self.url, self.length)
    }

    fn print_stats(&self) {
        info!(
            "{} HTTP requests, {} bytes downloaded ({:.2} MB)",
            self.http_request_count,
            self.http_request_bytes_read,
            self.http_request_bytes_read as f64 / MB_SIZE as f64
        );
        if self.length > 0 {
            info!(
                "downloaded {:.2}% of {}",
                self.http_request_bytes_read as f64 * 100.0 / self.length as f64,
                self.url
            );
        }
    }
}
