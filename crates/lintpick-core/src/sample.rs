//! 有界内容采样（只读文件前缀）
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// 读取文件前 `limit` 字节；`limit == 0` 表示整读
/// - 通过 `Read::take` 限流，超大文件的读取成本固定
/// - 预分配按 min(文件大小, limit)，避免为小文件开大缓冲
pub(crate) fn read_prefix(path: &Path, limit: u64) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let size = file.metadata().map(|md| md.len()).unwrap_or(0);
    let cap = if limit > 0 { size.min(limit) } else { size };
    let mut buf = Vec::with_capacity(cap as usize);
    let reader = BufReader::new(file);
    if limit > 0 {
        reader.take(limit).read_to_end(&mut buf)?;
    } else {
        let mut reader = reader;
        reader.read_to_end(&mut buf)?;
    }
    Ok(buf)
}

/// 判定缓冲区是否“明显是二进制”
/// 策略（保守，尽量不误杀文本）：
/// - 只看前 8KiB；
/// - 包含 NUL 字节即认为二进制；
/// - 否则可打印 ASCII 比例（含 tab/CR/LF）低于 25% 视为二进制（UTF-8 多字节按可打印计）。
pub(crate) fn is_probably_binary(buf: &[u8]) -> bool {
    let buf = &buf[..buf.len().min(8192)];
    if buf.is_empty() { return false; }
    if buf.contains(&0) { return true; }
    let printable = buf
        .iter()
        .filter(|&&b| matches!(b, 0x09 | 0x0A | 0x0D) || (0x20..=0x7E).contains(&b) || b >= 0x80)
        .count();
    let ratio = printable as f32 / (buf.len() as f32);
    ratio < 0.25
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn prefix_is_capped_at_limit() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&vec![b'a'; 10_000]).unwrap();
        let buf = read_prefix(tmp.path(), 4096).unwrap();
        assert_eq!(buf.len(), 4096);
    }

    #[test]
    fn small_file_read_whole() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"package main\n").unwrap();
        assert_eq!(read_prefix(tmp.path(), 64 * 1024).unwrap(), b"package main\n");
        assert_eq!(read_prefix(tmp.path(), 0).unwrap(), b"package main\n");
    }

    #[test]
    fn binary_heuristics() {
        assert!(is_probably_binary(b"\x7fELF\x02\x01\x01\x00\x00"));
        assert!(!is_probably_binary(b"fn main() {}\n"));
        assert!(!is_probably_binary("// комментарий\n".as_bytes()));
        assert!(!is_probably_binary(b""));
    }
}
