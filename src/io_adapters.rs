use crate::command::StreamSource;
use std::fs::File;
use std::io::Result as IoResult;
use std::process::Stdio;

/// The parent's own stream, passed through untouched.
pub struct Inherited;

impl StreamSource for Inherited {
    fn stdio(&self) -> IoResult<Stdio> {
        Ok(Stdio::inherit())
    }
}

/// Reads nothing, discards everything.
pub struct NullStream;

impl StreamSource for NullStream {
    fn stdio(&self) -> IoResult<Stdio> {
        Ok(Stdio::null())
    }
}

/// File-backed stream, e.g. for capturing children's output in tests.
///
/// Every child gets a duplicate of the same descriptor, so open the file in
/// append mode when several children write to it at once.
pub struct FileStream {
    file: File,
}

impl FileStream {
    pub fn new(file: File) -> Self {
        Self { file }
    }
}

impl StreamSource for FileStream {
    fn stdio(&self) -> IoResult<Stdio> {
        Ok(self.file.try_clone()?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;

    #[test]
    fn test_file_stream_hands_out_fresh_handles() {
        let dir = tempfile::tempdir().unwrap();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.path().join("out"))
            .unwrap();
        let stream = FileStream::new(file);

        assert!(stream.stdio().is_ok());
        assert!(stream.stdio().is_ok());
    }

    #[test]
    fn test_inherited_and_null_never_fail() {
        assert!(Inherited.stdio().is_ok());
        assert!(NullStream.stdio().is_ok());
    }
}
