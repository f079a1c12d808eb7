use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use headers::ContentType;
use tracing::debug;

use super::{ContentEncoder, EncodedBody, FILE_SIGIL};
use crate::scope::ParameterBag;
use crate::{PicaError, coerce};

/// Writes `multipart/form-data` parts into any [`Write`].
///
/// The terminating boundary is only written by [`MultipartWriter::finish`],
/// which also hands back the inner writer: the body cannot be read before
/// it is complete.
#[derive(Debug)]
pub struct MultipartWriter<W> {
    inner: W,
    boundary: String,
}

impl<W: Write> MultipartWriter<W> {
    /// Creates a writer with a random boundary.
    pub fn new(inner: W) -> Self {
        let boundary = format!("----formdata-pica-{}", uuid::Uuid::new_v4().simple());
        Self { inner, boundary }
    }

    /// Creates a writer with the given boundary.
    ///
    /// # Errors
    ///
    /// Fails when the boundary is empty, longer than 70 characters, or uses
    /// characters other than ASCII alphanumerics and `'+_-.`.
    pub fn with_boundary(inner: W, boundary: impl Into<String>) -> Result<Self, PicaError> {
        let boundary = check_boundary(boundary.into())?;
        Ok(Self { inner, boundary })
    }

    /// The boundary separating the parts.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// The `Content-Type` announcing this body, boundary included.
    ///
    /// # Errors
    ///
    /// Fails when the boundary cannot be carried by the header.
    pub fn content_type(&self) -> Result<ContentType, PicaError> {
        let mime = format!("multipart/form-data; boundary={}", self.boundary)
            .parse::<mime::Mime>()
            .map_err(|_| PicaError::InvalidBoundary {
                boundary: self.boundary.clone(),
            })?;
        Ok(ContentType::from(mime))
    }

    /// Writes a plain text field.
    ///
    /// # Errors
    ///
    /// Fails when the inner writer fails.
    pub fn write_field(&mut self, name: &str, value: &str) -> io::Result<()> {
        write!(
            self.inner,
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n",
            self.boundary,
            escape_quotes(name)
        )?;
        self.inner.write_all(value.as_bytes())?;
        self.inner.write_all(b"\r\n")
    }

    /// Writes a file field, copying `content` chunk by chunk.
    ///
    /// # Errors
    ///
    /// Fails when reading `content` or writing into the inner writer fails.
    pub fn write_file(
        &mut self,
        name: &str,
        filename: &str,
        content: &mut impl Read,
    ) -> io::Result<u64> {
        write!(
            self.inner,
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            self.boundary,
            escape_quotes(name),
            escape_quotes(filename)
        )?;
        let written = io::copy(content, &mut self.inner)?;
        self.inner.write_all(b"\r\n")?;
        Ok(written)
    }

    /// Writes the terminating boundary and returns the inner writer.
    ///
    /// # Errors
    ///
    /// Fails when the inner writer fails.
    pub fn finish(mut self) -> io::Result<W> {
        write!(self.inner, "--{}--\r\n", self.boundary)?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

const MAX_BOUNDARY_LEN: usize = 70;

fn check_boundary(boundary: String) -> Result<String, PicaError> {
    let valid = !boundary.is_empty()
        && boundary.len() <= MAX_BOUNDARY_LEN
        && boundary
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || "'+_-.".contains(ch));
    if valid {
        Ok(boundary)
    } else {
        Err(PicaError::InvalidBoundary { boundary })
    }
}

fn escape_quotes(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Encodes the bag as `multipart/form-data`.
///
/// A value starting with `@` is a local file path: the file is streamed into
/// a file field named by the key, with the path base name as filename. Other
/// values become plain fields.
#[derive(Debug, Clone, Default)]
pub struct MultipartEncoder {
    boundary: Option<String>,
}

impl MultipartEncoder {
    /// Uses a fixed boundary instead of a random one.
    ///
    /// # Errors
    ///
    /// Fails when the boundary is not valid, see [`MultipartWriter::with_boundary`].
    pub fn with_boundary(boundary: impl Into<String>) -> Result<Self, PicaError> {
        let boundary = check_boundary(boundary.into())?;
        Ok(Self {
            boundary: Some(boundary),
        })
    }

    /// Writes every parameter as a part, then finishes the writer.
    ///
    /// # Errors
    ///
    /// Fails when an attachment cannot be opened or read, or when the writer fails.
    pub fn encode_to<W: Write>(
        &self,
        params: &ParameterBag,
        mut writer: MultipartWriter<W>,
    ) -> Result<W, PicaError> {
        for (key, value) in params {
            let value = coerce(value);
            match value.strip_prefix(FILE_SIGIL) {
                Some(path) => write_attachment(&mut writer, key, Path::new(path))?,
                None => writer
                    .write_field(key, &value)
                    .map_err(|source| PicaError::MultipartWrite {
                        name: key.clone(),
                        source,
                    })?,
            }
        }

        writer.finish().map_err(|source| PicaError::MultipartWrite {
            name: "--".to_string(),
            source,
        })
    }
}

fn write_attachment<W: Write>(
    writer: &mut MultipartWriter<W>,
    key: &str,
    path: &Path,
) -> Result<(), PicaError> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file = File::open(path).map_err(|source| PicaError::Attachment {
        message: "Open source file failed",
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let size = writer
        .write_file(key, &filename, &mut reader)
        .map_err(|source| PicaError::Attachment {
            message: "Write to form file failed",
            path: path.to_path_buf(),
            source,
        })?;
    debug!(key, %filename, size, "attachment streamed");

    Ok(())
}

impl ContentEncoder for MultipartEncoder {
    fn encode(&self, params: &ParameterBag) -> Result<EncodedBody, PicaError> {
        let writer = match &self.boundary {
            Some(boundary) => MultipartWriter::with_boundary(Vec::new(), boundary.clone())?,
            None => MultipartWriter::new(Vec::new()),
        };
        let content_type = writer.content_type()?;
        let data = self.encode_to(params, writer)?;

        Ok(EncodedBody {
            content_type: Some(content_type),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use rstest::rstest;

    use super::*;
    use crate::ScriptValue;

    struct TempFile(PathBuf);

    impl TempFile {
        fn create(name: &str, content: &[u8]) -> Self {
            let dir = std::env::temp_dir().join(format!("pica-{}", uuid::Uuid::new_v4()));
            fs::create_dir_all(&dir).expect("temp dir");
            let path = dir.join(name);
            fs::write(&path, content).expect("temp file");
            Self(path)
        }

        fn sigil(&self) -> ScriptValue {
            ScriptValue::Text(format!("@{}", self.0.display()))
        }
    }

    impl Drop for TempFile {
        fn drop(&mut self) {
            if let Some(dir) = self.0.parent() {
                let _ = fs::remove_dir_all(dir);
            }
        }
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_multipart_plain_field() {
        let mut params = ParameterBag::new();
        params.insert("name".to_string(), "alice".into());
        params.insert("age".to_string(), 30.into());

        let body = MultipartEncoder::with_boundary("XXX")
            .expect("valid boundary")
            .encode(&params)
            .expect("should encode");

        insta::assert_snapshot!(
            body.content_type.expect("multipart content type").to_string(),
            @"multipart/form-data; boundary=XXX"
        );
        let text = String::from_utf8(body.data).expect("utf-8");
        assert_eq!(
            text,
            "--XXX\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nalice\r\n\
             --XXX\r\nContent-Disposition: form-data; name=\"age\"\r\n\r\n30\r\n\
             --XXX--\r\n"
        );
    }

    #[test]
    fn test_multipart_file_field() {
        let file = TempFile::create("f.txt", b"hello\nfrom a file");
        let mut params = ParameterBag::new();
        params.insert("upload".to_string(), file.sigil());

        let body = MultipartEncoder::with_boundary("XXX")
            .expect("valid boundary")
            .encode(&params)
            .expect("should encode");

        let text = String::from_utf8(body.data).expect("utf-8");
        assert_eq!(
            text,
            "--XXX\r\nContent-Disposition: form-data; name=\"upload\"; filename=\"f.txt\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             hello\nfrom a file\r\n\
             --XXX--\r\n"
        );
    }

    #[test]
    fn test_multipart_missing_file_is_an_error() {
        let mut params = ParameterBag::new();
        params.insert("upload".to_string(), "@/definitely/not/here.txt".into());

        let error = MultipartEncoder::default()
            .encode(&params)
            .expect_err("should fail");

        assert!(matches!(
            error,
            PicaError::Attachment {
                message: "Open source file failed",
                ..
            }
        ));
        assert!(error.to_string().contains("/definitely/not/here.txt"));
    }

    #[test]
    fn test_multipart_plain_field_write_failure_aborts() {
        let mut params = ParameterBag::new();
        params.insert("name".to_string(), "alice".into());

        let result = MultipartEncoder::default()
            .encode_to(&params, MultipartWriter::new(BrokenWriter));

        assert!(matches!(
            result,
            Err(PicaError::MultipartWrite { ref name, .. }) if name == "name"
        ));
    }

    #[test]
    fn test_multipart_empty_bag_has_terminating_boundary() {
        let body = MultipartEncoder::with_boundary("XXX")
            .expect("valid boundary")
            .encode(&ParameterBag::new())
            .expect("should encode");

        assert_eq!(body.data, b"--XXX--\r\n");
    }

    #[test]
    fn test_random_boundary_is_announced() {
        let writer = MultipartWriter::new(Vec::new());

        let content_type = writer.content_type().expect("valid boundary").to_string();

        assert!(content_type.starts_with("multipart/form-data; boundary=----formdata-pica-"));
        assert!(content_type.ends_with(writer.boundary()));
    }

    #[rstest]
    #[case("")]
    #[case("with space")]
    #[case("semi;colon")]
    #[case("quo\"te")]
    fn test_invalid_boundary_is_rejected(#[case] boundary: &str) {
        let result = MultipartEncoder::with_boundary(boundary);

        assert!(matches!(
            result,
            Err(PicaError::InvalidBoundary { boundary: ref rejected }) if rejected == boundary
        ));
        assert!(MultipartWriter::with_boundary(Vec::new(), boundary).is_err());
    }

    #[test]
    fn test_boundary_length_is_bounded() {
        assert!(MultipartEncoder::with_boundary("x".repeat(70)).is_ok());
        assert!(matches!(
            MultipartEncoder::with_boundary("x".repeat(71)),
            Err(PicaError::InvalidBoundary { .. })
        ));
    }

    #[test]
    fn test_boundary_with_allowed_punctuation() {
        let writer = MultipartWriter::with_boundary(Vec::new(), "--a.b_c+d'e")
            .expect("valid boundary");

        let content_type = writer.content_type().expect("announced boundary");

        insta::assert_snapshot!(content_type.to_string(), @"multipart/form-data; boundary=--a.b_c+d'e");
    }

    #[test]
    fn test_escape_quotes() {
        assert_eq!(escape_quotes(r#"a"b\c"#), r#"a\"b\\c"#);
    }
}
