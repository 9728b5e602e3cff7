//! Where cached catalog files live and how they are encoded.
//!
//! A [`LocalFileSpec`] only declares a path relative to the host's data
//! directory and a format; reading and writing the bytes belongs to the
//! host's file layer. [`FormatSerializer`] is the decoding capability that
//! layer hands in.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ParseError;
use crate::models::SeiyuuList;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Xml,
    Json,
}

pub trait LocalFileSpec {
    type Item: Serialize + DeserializeOwned;

    /// Path relative to the host data directory.
    fn relative_path(&self) -> PathBuf;

    fn format(&self) -> FileFormat;
}

/// The voice-actor list shared by every AniDB series.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeiyuuListFileSpec;

impl LocalFileSpec for SeiyuuListFileSpec {
    type Item = SeiyuuList;

    fn relative_path(&self) -> PathBuf {
        Path::new("anidb").join("seiyuu.xml")
    }

    fn format(&self) -> FileFormat {
        FileFormat::Xml
    }
}

pub trait FormatSerializer {
    /// Decode `bytes`; `path` only labels errors.
    fn deserialize<T: DeserializeOwned>(
        &self,
        format: FileFormat,
        bytes: &[u8],
        path: &Path,
    ) -> Result<T, ParseError>;

    fn serialize<T: Serialize>(
        &self,
        format: FileFormat,
        value: &T,
        path: &Path,
    ) -> Result<Vec<u8>, ParseError>;
}

/// quick-xml for XML documents, serde_json for JSON ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogSerializer;

impl FormatSerializer for CatalogSerializer {
    fn deserialize<T: DeserializeOwned>(
        &self,
        format: FileFormat,
        bytes: &[u8],
        path: &Path,
    ) -> Result<T, ParseError> {
        match format {
            FileFormat::Xml => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| ParseError::new(path, "<document>", e.to_string()))?;
                decode_xml(text, path)
            }
            FileFormat::Json => decode_json(bytes, path),
        }
    }

    fn serialize<T: Serialize>(
        &self,
        format: FileFormat,
        value: &T,
        path: &Path,
    ) -> Result<Vec<u8>, ParseError> {
        match format {
            FileFormat::Xml => {
                let body = quick_xml::se::to_string(value)
                    .map_err(|e| ParseError::new(path, "<document>", e.to_string()))?;
                Ok(format!("{XML_DECLARATION}{body}\n").into_bytes())
            }
            FileFormat::Json => serde_json::to_vec_pretty(value)
                .map_err(|e| ParseError::new(path, "<document>", e.to_string())),
        }
    }
}

/// Decode an XML document into `T`, labelling failures with `path`.
pub fn decode_xml<T: DeserializeOwned>(text: &str, path: &Path) -> Result<T, ParseError> {
    let text = text.trim_start_matches('\u{feff}');
    let de = &mut quick_xml::de::Deserializer::from_str(text);
    serde_path_to_error::deserialize(de).map_err(|e| ParseError::from_tracked(path, e))
}

/// Decode a JSON document into `T`, labelling failures with `path`.
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8], path: &Path) -> Result<T, ParseError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(de).map_err(|e| ParseError::from_tracked(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeiyuuRecord;

    const SEIYUU_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<SeiyuuList>
  <Seiyuu>
    <ID>12</ID>
    <Name>Yamadera Kouichi</Name>
    <PictureFileName>12345.jpg</PictureFileName>
  </Seiyuu>
  <Seiyuu>
    <ID>40</ID>
    <Name>Hayashibara Megumi</Name>
  </Seiyuu>
</SeiyuuList>"#;

    fn spec_path() -> PathBuf {
        SeiyuuListFileSpec.relative_path()
    }

    #[test]
    fn test_seiyuu_spec_location() {
        assert_eq!(spec_path(), Path::new("anidb").join("seiyuu.xml"));
        assert_eq!(SeiyuuListFileSpec.format(), FileFormat::Xml);
    }

    #[test]
    fn test_reads_seiyuu_list() {
        let list: SeiyuuList = CatalogSerializer
            .deserialize(FileFormat::Xml, SEIYUU_XML.as_bytes(), &spec_path())
            .unwrap();
        assert_eq!(list.seiyuu.len(), 2);
        assert_eq!(list.seiyuu[0].name, "Yamadera Kouichi");
        assert_eq!(
            list.seiyuu[0].picture_url().as_deref(),
            Some("http://img7.anidb.net/pics/anime/12345.jpg")
        );
        assert_eq!(list.seiyuu[1].picture_file_name, None);
    }

    #[test]
    fn test_written_list_reads_back() {
        let list = SeiyuuList {
            seiyuu: vec![SeiyuuRecord {
                id: 7,
                name: "Ishizuka Unshou".into(),
                picture_file_name: Some("7.jpg".into()),
            }],
        };
        let bytes = CatalogSerializer
            .serialize(FileFormat::Xml, &list, &spec_path())
            .unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("<SeiyuuList>"));
        assert!(!text.contains("PictureUrl"));

        let back: SeiyuuList = CatalogSerializer
            .deserialize(FileFormat::Xml, &bytes, &spec_path())
            .unwrap();
        assert_eq!(back, list);
    }

    #[test]
    fn test_missing_field_names_field_and_path() {
        let xml = "<SeiyuuList><Seiyuu><Name>Nobody</Name></Seiyuu></SeiyuuList>";
        let err = CatalogSerializer
            .deserialize::<SeiyuuList>(FileFormat::Xml, xml.as_bytes(), &spec_path())
            .unwrap_err();
        assert_eq!(err.field, "ID");
        assert_eq!(err.path, spec_path());
    }

    #[test]
    fn test_malformed_id_names_field() {
        let xml = "<SeiyuuList><Seiyuu><ID>abc</ID><Name>x</Name></Seiyuu></SeiyuuList>";
        let err = CatalogSerializer
            .deserialize::<SeiyuuList>(FileFormat::Xml, xml.as_bytes(), &spec_path())
            .unwrap_err();
        assert_eq!(err.field, "ID");
        assert_eq!(err.path, spec_path());
    }

    #[test]
    fn test_malformed_json_value_names_field() {
        let path = Path::new("anidb/seiyuu.json");
        let err = CatalogSerializer
            .deserialize::<SeiyuuRecord>(FileFormat::Json, br#"{"ID":"abc","Name":"x"}"#, path)
            .unwrap_err();
        assert_eq!(err.field, "ID");
    }

    #[test]
    fn test_json_errors_carry_path() {
        let path = Path::new("tvdb/1/series.json");
        let err = CatalogSerializer
            .deserialize::<SeiyuuRecord>(FileFormat::Json, br#"{"Name":"x"}"#, path)
            .unwrap_err();
        assert_eq!(err.field, "ID");
        assert_eq!(err.path, path);
    }
}
