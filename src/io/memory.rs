use super::ReadAt;
use async_trait::async_trait;
use std::io;

/// Random access over a fully buffered download
pub struct MemoryReader {
    data: Vec<u8>,
}

impl MemoryReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

#[async_trait]
impl ReadAt for MemoryReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let Ok(start) = usize::try_from(offset) else {
            return Ok(0);
        };
        if start >= self.data.len() {
            return Ok(0);
        }

        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn short_read_at_the_tail() {
        let reader = MemoryReader::new(b"abcdef".to_vec());
        let mut buf = [0u8; 4];
        assert_eq!(reader.read_at(4, &mut buf).await.unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(reader.read_at(10, &mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn read_exact_past_end_is_eof() {
        let reader = MemoryReader::new(b"abcdef".to_vec());
        let mut buf = [0u8; 4];
        let err = reader.read_exact_at(3, &mut buf).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        reader.read_exact_at(1, &mut buf).await.unwrap();
        assert_eq!(&buf, b"bcde");
    }
}
