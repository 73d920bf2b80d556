//! Minimal `printf` formatting engine.
//!
//! Supports the directives the source language's own programs use:
//! `%d`, `%x`, `%c`, `%s`, `%.*s`, and `%%`. Arguments are consumed
//! positionally regardless of directive; a directive with no argument
//! left formats a zero. Anything unrecognized after `%` is passed
//! through untouched, escape-free formatting being the caller's
//! problem.

use crate::error::VmError;
use crate::memory::Memory;

/// Formats `args` against the NUL-terminated format string at
/// `fmt_addr`, returning the output bytes.
pub(crate) fn format(mem: &Memory, fmt_addr: i64, args: &[i64]) -> Result<Vec<u8>, VmError> {
    let fmt = mem.read_cstr(fmt_addr)?.to_vec();
    let mut out = Vec::with_capacity(fmt.len());
    let mut next_arg = 0usize;
    let mut take = |n: &mut usize| -> i64 {
        let v = args.get(*n).copied().unwrap_or(0);
        *n += 1;
        v
    };

    let mut i = 0;
    while i < fmt.len() {
        let b = fmt[i];
        i += 1;
        if b != b'%' {
            out.push(b);
            continue;
        }
        let Some(&directive) = fmt.get(i) else {
            out.push(b'%');
            break;
        };
        i += 1;
        match directive {
            b'd' => out.extend_from_slice(take(&mut next_arg).to_string().as_bytes()),
            b'x' => out.extend_from_slice(format!("{:x}", take(&mut next_arg)).as_bytes()),
            b'c' => out.push(take(&mut next_arg) as u8),
            b's' => {
                let addr = take(&mut next_arg);
                if addr == 0 {
                    out.extend_from_slice(b"(null)");
                } else {
                    out.extend_from_slice(mem.read_cstr(addr)?);
                }
            }
            b'.' if fmt.get(i) == Some(&b'*') && fmt.get(i + 1) == Some(&b's') => {
                i += 2;
                let limit = take(&mut next_arg).max(0) as usize;
                let addr = take(&mut next_arg);
                let s = if addr == 0 {
                    &b"(null)"[..]
                } else {
                    mem.read_cstr(addr)?
                };
                out.extend_from_slice(&s[..s.len().min(limit)]);
            }
            b'%' => out.push(b'%'),
            other => {
                out.push(b'%');
                out.push(other);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use minc_lir::layout::DATA_BASE;

    fn mem_with(bytes: &[u8]) -> Memory {
        let mut m = Memory::new(4096);
        m.write_bytes(DATA_BASE, bytes).unwrap();
        m
    }

    #[test]
    fn test_plain_text() {
        let m = mem_with(b"hello\n\0");
        assert_eq!(format(&m, DATA_BASE, &[]).unwrap(), b"hello\n");
    }

    #[test]
    fn test_decimal_and_hex() {
        let m = mem_with(b"%d %x\0");
        assert_eq!(format(&m, DATA_BASE, &[-5, 255]).unwrap(), b"-5 ff");
    }

    #[test]
    fn test_char() {
        let m = mem_with(b"[%c]\0");
        assert_eq!(format(&m, DATA_BASE, &[65]).unwrap(), b"[A]");
    }

    #[test]
    fn test_string() {
        let m = mem_with(b"%s!\0world\0");
        assert_eq!(format(&m, DATA_BASE, &[DATA_BASE + 3]).unwrap(), b"world!");
    }

    #[test]
    fn test_null_string() {
        let m = mem_with(b"%s\0");
        assert_eq!(format(&m, DATA_BASE, &[0]).unwrap(), b"(null)");
    }

    #[test]
    fn test_precision_string() {
        let m = mem_with(b"%.*s\0abcdef\0");
        assert_eq!(format(&m, DATA_BASE, &[3, DATA_BASE + 5]).unwrap(), b"abc");
    }

    #[test]
    fn test_percent_escape() {
        let m = mem_with(b"100%%\0");
        assert_eq!(format(&m, DATA_BASE, &[]).unwrap(), b"100%");
    }

    #[test]
    fn test_unknown_directive_passes_through() {
        let m = mem_with(b"%q\0");
        assert_eq!(format(&m, DATA_BASE, &[]).unwrap(), b"%q");
    }

    #[test]
    fn test_missing_argument_formats_zero() {
        let m = mem_with(b"%d\0");
        assert_eq!(format(&m, DATA_BASE, &[]).unwrap(), b"0");
    }
}
