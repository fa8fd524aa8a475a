//! ZIP archive access for the spreadsheet package.
//! Part names are decoded under the charset assumed at open time; a different charset needs a reopen.

use crate::error::SheetError;
use crate::helpers::encoding;
use crate::helpers::xml::XmlReader;
use encoding_rs::Encoding;
use encoding_rs::UTF_8;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;
use std::path::PathBuf;
use zip::read::ZipFile;
use zip::ZipArchive;

/// Leading bytes of an OLE compound file, the container of password protected workbooks
const COMPOUND_FILE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

type PackageReader = BufReader<File>;

/// An opened spreadsheet package
pub(crate) struct ZipPackage {
    path: PathBuf,
    /// Charset assumed for part names and for parts without their own encoding marker
    charset: &'static Encoding,
    zip: ZipArchive<PackageReader>,
    /// Part names decoded under `charset`, by archive entry index
    names: Vec<String>,
}

impl ZipPackage {
    /// Opens the archive at `path`, decoding part names with `charset`
    pub(crate) fn open(path: &Path, charset: &'static Encoding) -> Result<ZipPackage, SheetError> {
        let mut reader = BufReader::new(File::open(path)?);
        if is_compound_file(&mut reader)? {
            Err(SheetError::PasswordProtected)?;
        }

        let mut zip = ZipArchive::new(reader)?;
        let names = (0..zip.len())
            .map(|index| {
                let file = zip.by_index_raw(index)?;
                Ok(decode_name(file.name_raw(), file.name(), charset))
            })
            .collect::<Result<Vec<String>, SheetError>>()?;
        log::debug!("Opened '{}' with {} parts as {}", path.display(), names.len(), charset.name());
        Ok(ZipPackage {
            path: path.to_path_buf(),
            charset,
            zip,
            names,
        })
    }

    /// Closes the archive and opens it again under the corrected charset.
    /// Readers of the previous handle cannot outlive this call.
    pub(crate) fn reopen(&mut self, charset: &'static Encoding) -> Result<(), SheetError> {
        log::debug!(
            "Reopening '{}' as {} instead of {}",
            self.path.display(),
            charset.name(),
            self.charset.name()
        );
        let path = self.path.clone();
        *self = ZipPackage::open(&path, charset)?;
        Ok(())
    }

    pub(crate) fn charset(&self) -> &'static Encoding {
        self.charset
    }

    /// Finds a part by name (case-insensitive, path separator agnostic)
    fn index_of(&self, name: &str) -> Option<usize> {
        let pattern = normalize(name);
        self.names
            .iter()
            .position(|file_name| pattern.eq_ignore_ascii_case(&normalize(file_name)))
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Opens a part as a decompressed byte stream
    pub(crate) fn part(&'_ mut self, name: &str) -> Result<ZipFile<'_, PackageReader>, SheetError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| SheetError::PartNotFound(name.to_owned()))?;
        Ok(self.zip.by_index(index)?)
    }

    /// Runs the encoding detector over the head of a part
    pub(crate) fn detect_encoding(&mut self, name: &str) -> Result<Option<&'static Encoding>, SheetError> {
        let mut reader = BufReader::new(self.part(name)?);
        Ok(encoding::detect(&mut reader)?)
    }

    /// Creates an XML reader for a part, transcoding it to UTF-8 when needed.
    /// A byte-order mark or declaration in the part wins over the archive charset.
    pub(crate) fn xml_reader(&'_ mut self, name: &str) -> Result<XmlReader<PartReader<'_>>, SheetError> {
        let charset = self.charset;
        let mut reader = BufReader::new(self.part(name)?);
        let encoding = match encoding::detect(&mut reader)? {
            Some(encoding) => encoding,
            None if charset.is_ascii_compatible() => charset,
            // two-byte text is always detectable, so this part is not in the archive charset
            None => UTF_8,
        };
        log::debug!("Reading part '{name}' as {}", encoding.name());

        let part = if encoding == UTF_8 {
            encoding::skip_utf8_bom(&mut reader)?;
            PartReader::Raw(reader)
        } else {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            let (text, _, had_errors) = encoding.decode(&bytes);
            if had_errors {
                log::debug!("Part '{name}' contains bytes invalid in {}", encoding.name());
            }
            PartReader::Decoded(Cursor::new(text.into_owned().into_bytes()))
        };
        Ok(XmlReader::new(part))
    }

    /// Same as [`ZipPackage::xml_reader`], but an absent part is not an error
    pub(crate) fn xml_reader_if_exists(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<XmlReader<PartReader<'_>>>, SheetError> {
        if self.contains(name) {
            self.xml_reader(name).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Byte stream of one part: streamed as is when UTF-8, otherwise transcoded up front
pub(crate) enum PartReader<'a> {
    Raw(BufReader<ZipFile<'a, PackageReader>>),
    Decoded(Cursor<Vec<u8>>),
}

impl Read for PartReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            PartReader::Raw(reader) => reader.read(buf),
            PartReader::Decoded(reader) => reader.read(buf),
        }
    }
}

impl BufRead for PartReader<'_> {
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        match self {
            PartReader::Raw(reader) => reader.fill_buf(),
            PartReader::Decoded(reader) => reader.fill_buf(),
        }
    }

    fn consume(&mut self, amount: usize) {
        match self {
            PartReader::Raw(reader) => reader.consume(amount),
            PartReader::Decoded(reader) => reader.consume(amount),
        }
    }
}

fn normalize(name: &str) -> String {
    name.replace('\\', "/").trim_start_matches('/').to_owned()
}

/// Decodes an entry name. Names flagged as UTF-8 keep the zip crate's reading;
/// the others are legacy bytes in the archive charset.
fn decode_name(raw: &[u8], decoded: &str, charset: &'static Encoding) -> String {
    // Unflagged names are read as CP437, which never matches the UTF-8 reading of non-ASCII bytes
    let is_utf8_flagged = !raw.is_ascii() && std::str::from_utf8(raw).is_ok_and(|name| name == decoded);
    if is_utf8_flagged {
        decoded.to_owned()
    } else if charset.is_ascii_compatible() {
        charset.decode_without_bom_handling(raw).0.into_owned()
    } else {
        String::from_utf8_lossy(raw).into_owned()
    }
}

/// Checks for the compound file signature and rewinds
fn is_compound_file<R: Read + Seek>(reader: &mut R) -> Result<bool, SheetError> {
    let mut signature = Vec::with_capacity(COMPOUND_FILE_SIGNATURE.len());
    reader
        .by_ref()
        .take(COMPOUND_FILE_SIGNATURE.len() as u64)
        .read_to_end(&mut signature)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(signature == COMPOUND_FILE_SIGNATURE)
}
