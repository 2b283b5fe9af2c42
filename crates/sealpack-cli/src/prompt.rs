//! Password input: masked terminal prompt, piped stdin, and confirmation
//! prompts for the packing tool.

use std::io::{self, BufRead, IsTerminal, Read, Write};

use dialoguer::Password;
use secrecy::SecretString;
use zeroize::{Zeroize, Zeroizing};

use sealpack_core::extractor::ensure_non_empty;
use sealpack_core::{Cancellation, PasswordSource, Result, SealError};

/// Reads the password from the controlling terminal without echo, or one
/// line from stdin when stdin is not a terminal.
///
/// A read interrupted by a signal gives up with `SealError::Interrupted`
/// once `cancellation` is raised; otherwise it is retried.
pub struct TerminalPrompt {
    prompt: String,
    cancellation: Cancellation,
}

impl TerminalPrompt {
    pub fn new(prompt: impl Into<String>, cancellation: Cancellation) -> Self {
        Self {
            prompt: prompt.into(),
            cancellation,
        }
    }
}

impl PasswordSource for TerminalPrompt {
    fn acquire(&mut self) -> Result<SecretString> {
        let password = if io::stdin().is_terminal() {
            read_masked(&self.prompt, &self.cancellation)?
        } else {
            read_piped_line(io::stdin().lock(), &self.cancellation)?
        };
        ensure_non_empty(password)
    }
}

/// Prompt for a new password with confirmation (packing side).
pub fn prompt_new_password() -> anyhow::Result<SecretString> {
    if !io::stdin().is_terminal() {
        return Ok(read_piped_line(io::stdin().lock(), &Cancellation::new())?);
    }
    Password::new()
        .with_prompt("Package password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Read a single line as the password; the line terminator is dropped.
pub fn read_piped_line<R: BufRead>(
    mut reader: R,
    cancellation: &Cancellation,
) -> Result<SecretString> {
    let mut line = Zeroizing::new(Vec::new());
    loop {
        cancellation.check()?;
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                cancellation.check()?;
                continue;
            }
            Err(err) => {
                return Err(SealError::PasswordUnavailable(format!(
                    "Failed to read from stdin: {}",
                    err
                )))
            }
        };
        if available.is_empty() {
            break;
        }
        let (used, complete) = match available.iter().position(|&b| b == b'\n') {
            Some(end) => (end + 1, true),
            None => (available.len(), false),
        };
        line.extend_from_slice(&available[..used]);
        reader.consume(used);
        if complete {
            break;
        }
    }

    if line.is_empty() {
        return Err(SealError::PasswordUnavailable(
            "Input stream closed".to_string(),
        ));
    }
    while matches!(line.last(), Some(b'\n' | b'\r')) {
        line.pop();
    }
    into_secret(line)
}

fn into_secret(mut bytes: Zeroizing<Vec<u8>>) -> Result<SecretString> {
    match String::from_utf8(std::mem::take(&mut *bytes)) {
        Ok(password) => Ok(SecretString::from(password)),
        Err(err) => {
            err.into_bytes().zeroize();
            Err(SealError::PasswordUnavailable(
                "Password is not valid UTF-8".to_string(),
            ))
        }
    }
}

/// Collect keystrokes from a terminal in non-canonical mode until Enter.
#[cfg_attr(not(unix), allow(dead_code))]
fn read_secret_bytes<R: Read>(
    mut reader: R,
    cancellation: &Cancellation,
) -> Result<Zeroizing<Vec<u8>>> {
    let mut buffer = Zeroizing::new(Vec::with_capacity(128));
    let mut byte = Zeroizing::new([0u8; 1]);
    loop {
        cancellation.check()?;
        match reader.read(&mut byte[..]) {
            Ok(0) => return Err(closed_input()),
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                cancellation.check()?;
                continue;
            }
            Err(err) => {
                return Err(SealError::PasswordUnavailable(format!(
                    "Failed to read from terminal: {}",
                    err
                )))
            }
        }
        match keys::classify(byte[0], buffer.is_empty()) {
            keys::Key::Submit => return Ok(buffer),
            keys::Key::Interrupt => return Err(SealError::Interrupted),
            keys::Key::EndOfInput => return Err(closed_input()),
            keys::Key::Erase => keys::pop_char(&mut buffer),
            keys::Key::Kill => buffer.clear(),
            keys::Key::Ignore => {}
            keys::Key::Char(value) => buffer.push(value),
        }
    }
}

fn closed_input() -> SealError {
    SealError::PasswordUnavailable("Input stream closed".to_string())
}

#[cfg(unix)]
fn read_masked(prompt: &str, cancellation: &Cancellation) -> Result<SecretString> {
    let mut stderr = io::stderr();
    let _ = write!(stderr, "{}: ", prompt);
    let _ = stderr.flush();

    let guard = terminal::NoEchoGuard::acquire(libc::STDIN_FILENO).map_err(|e| {
        SealError::PasswordUnavailable(format!("Failed to configure terminal: {}", e))
    })?;
    let outcome = read_secret_bytes(io::stdin().lock(), cancellation);
    drop(guard);
    let _ = writeln!(stderr);

    into_secret(outcome?)
}

#[cfg(not(unix))]
fn read_masked(prompt: &str, _cancellation: &Cancellation) -> Result<SecretString> {
    Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map(SecretString::from)
        .map_err(|e| SealError::PasswordUnavailable(format!("Failed to read password: {}", e)))
}

#[cfg(unix)]
mod terminal {
    use std::io;
    use std::mem::MaybeUninit;
    use std::os::unix::io::RawFd;

    /// Terminal mode with echo, line editing and signal keys switched off.
    ///
    /// The saved mode is restored on drop. Ctrl-C arrives as a byte while
    /// ISIG is off. SIGTERM and SIGHUP reach the process's handlers, which
    /// only raise the cancellation flag; the blocked read then fails with
    /// EINTR and the prompt unwinds through this guard. SIGKILL cannot be
    /// caught and leaves the terminal as it is.
    pub struct NoEchoGuard {
        fd: RawFd,
        saved: libc::termios,
    }

    impl NoEchoGuard {
        pub fn acquire(fd: RawFd) -> io::Result<Self> {
            let mut saved = MaybeUninit::<libc::termios>::uninit();
            // SAFETY: tcgetattr fills the struct on success; checked below.
            if unsafe { libc::tcgetattr(fd, saved.as_mut_ptr()) } != 0 {
                return Err(io::Error::last_os_error());
            }
            let saved = unsafe { saved.assume_init() };

            let mut raw = saved;
            raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::ISIG);
            raw.c_cc[libc::VMIN] = 1;
            raw.c_cc[libc::VTIME] = 0;
            // SAFETY: raw is a fully initialized termios copied from the device.
            if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw) } != 0 {
                return Err(io::Error::last_os_error());
            }

            Ok(Self { fd, saved })
        }
    }

    impl Drop for NoEchoGuard {
        fn drop(&mut self) {
            // SAFETY: restores the attributes read in `acquire`.
            unsafe {
                libc::tcsetattr(self.fd, libc::TCSAFLUSH, &self.saved);
            }
        }
    }
}

#[cfg_attr(not(unix), allow(dead_code))]
mod keys {
    #[derive(Debug, PartialEq, Eq)]
    pub enum Key {
        Submit,
        Interrupt,
        EndOfInput,
        Erase,
        Kill,
        Ignore,
        Char(u8),
    }

    /// Map a raw input byte to an editing action.
    pub fn classify(byte: u8, buffer_empty: bool) -> Key {
        match byte {
            b'\n' | b'\r' => Key::Submit,
            0x03 => Key::Interrupt,
            0x04 if buffer_empty => Key::EndOfInput,
            0x7f | 0x08 => Key::Erase,
            0x15 => Key::Kill,
            0x00..=0x1f => Key::Ignore,
            other => Key::Char(other),
        }
    }

    /// Remove the last UTF-8 character from `buffer`.
    pub fn pop_char(buffer: &mut Vec<u8>) {
        while let Some(byte) = buffer.pop() {
            // Stop once a lead or ASCII byte is removed.
            if byte & 0b1100_0000 != 0b1000_0000 {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    /// Raises the flag and fails with EINTR, like a blocked read hit by SIGTERM.
    struct SignalledRead(Cancellation);

    impl Read for SignalledRead {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            self.0.cancel();
            Err(io::Error::from(io::ErrorKind::Interrupted))
        }
    }

    /// One EINTR with no cancellation pending, then the data.
    struct SpuriousWakeup {
        woken: bool,
        data: &'static [u8],
    }

    impl Read for SpuriousWakeup {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.woken {
                self.woken = true;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            self.data.read(buf)
        }
    }

    fn piped(input: &[u8]) -> Result<SecretString> {
        read_piped_line(input, &Cancellation::new())
    }

    #[test]
    fn test_piped_line_strips_newline() {
        let password = piped(b"correct-horse\n").unwrap();
        assert_eq!(password.expose_secret(), "correct-horse");
    }

    #[test]
    fn test_piped_line_strips_crlf_only() {
        let password = piped(b"  spaced \r\n").unwrap();
        assert_eq!(password.expose_secret(), "  spaced ");
    }

    #[test]
    fn test_piped_line_reads_first_line() {
        let password = piped(b"first\nsecond\n").unwrap();
        assert_eq!(password.expose_secret(), "first");
    }

    #[test]
    fn test_piped_line_without_terminator() {
        let password = piped(b"no-newline").unwrap();
        assert_eq!(password.expose_secret(), "no-newline");
    }

    #[test]
    fn test_piped_closed_stream() {
        let result = piped(b"");
        assert!(matches!(result, Err(SealError::PasswordUnavailable(_))));
    }

    #[test]
    fn test_piped_rejects_invalid_utf8() {
        let result = piped(b"\xff\xfe\n");
        assert!(matches!(result, Err(SealError::PasswordUnavailable(_))));
    }

    #[test]
    fn test_piped_read_gives_up_when_signalled() {
        let cancellation = Cancellation::new();
        let reader = io::BufReader::new(SignalledRead(cancellation.clone()));

        let result = read_piped_line(reader, &cancellation);

        assert!(matches!(result, Err(SealError::Interrupted)));
    }

    #[test]
    fn test_piped_read_retries_spurious_interrupt() {
        let reader = io::BufReader::new(SpuriousWakeup {
            woken: false,
            data: b"correct-horse\n",
        });

        let password = read_piped_line(reader, &Cancellation::new()).unwrap();
        assert_eq!(password.expose_secret(), "correct-horse");
    }

    #[test]
    fn test_secret_bytes_line_editing() {
        let bytes = read_secret_bytes(&b"pax\x7fss\x15pass\x01\n"[..], &Cancellation::new())
            .unwrap();
        assert_eq!(bytes.as_slice(), b"pass");
    }

    #[test]
    fn test_secret_bytes_ctrl_c_is_interrupt() {
        let result = read_secret_bytes(&b"pa\x03"[..], &Cancellation::new());
        assert!(matches!(result, Err(SealError::Interrupted)));
    }

    #[test]
    fn test_secret_bytes_ctrl_d_on_empty_is_closed() {
        let result = read_secret_bytes(&b"\x04"[..], &Cancellation::new());
        assert!(matches!(result, Err(SealError::PasswordUnavailable(_))));
    }

    #[test]
    fn test_secret_bytes_gives_up_when_signalled() {
        let cancellation = Cancellation::new();

        let result = read_secret_bytes(SignalledRead(cancellation.clone()), &cancellation);

        assert!(matches!(result, Err(SealError::Interrupted)));
    }

    #[test]
    fn test_secret_bytes_retries_spurious_interrupt() {
        let reader = SpuriousWakeup {
            woken: false,
            data: b"secret\r",
        };

        let bytes = read_secret_bytes(reader, &Cancellation::new()).unwrap();
        assert_eq!(bytes.as_slice(), b"secret");
    }

    #[test]
    fn test_classify_keys() {
        use keys::{classify, Key};

        assert_eq!(classify(b'\n', false), Key::Submit);
        assert_eq!(classify(b'\r', true), Key::Submit);
        assert_eq!(classify(0x03, false), Key::Interrupt);
        assert_eq!(classify(0x04, true), Key::EndOfInput);
        assert_eq!(classify(0x04, false), Key::Ignore);
        assert_eq!(classify(0x7f, false), Key::Erase);
        assert_eq!(classify(0x15, false), Key::Kill);
        assert_eq!(classify(b'a', true), Key::Char(b'a'));
    }

    #[test]
    fn test_pop_char_handles_multibyte() {
        let mut buffer = "pé".as_bytes().to_vec();
        keys::pop_char(&mut buffer);
        assert_eq!(buffer, b"p");
        keys::pop_char(&mut buffer);
        assert!(buffer.is_empty());
        keys::pop_char(&mut buffer);
        assert!(buffer.is_empty());
    }
}
