//! Case data model
//!
//! Plain records loaded from the case database. Nothing here talks to SQLite;
//! see [`super::sqlite`] for that.

use serde::{Deserialize, Serialize};

// ============================================================================
// Attribute values
// ============================================================================

/// Storage kind of an attribute value, as recorded in the `value_type` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    String,
    Integer,
    Long,
    Double,
    Bytes,
    DateTime,
}

impl ValueType {
    /// Decode the on-disk value type code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ValueType::String),
            1 => Some(ValueType::Integer),
            2 => Some(ValueType::Long),
            3 => Some(ValueType::Double),
            4 => Some(ValueType::Bytes),
            5 => Some(ValueType::DateTime),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            ValueType::String => 0,
            ValueType::Integer => 1,
            ValueType::Long => 2,
            ValueType::Double => 3,
            ValueType::Bytes => 4,
            ValueType::DateTime => 5,
        }
    }
}

/// A typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    String(String),
    Integer(i32),
    Long(i64),
    Double(f64),
    /// Seconds since the Unix epoch
    DateTime(i64),
    Bytes(Vec<u8>),
}

impl AttributeValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            AttributeValue::String(_) => ValueType::String,
            AttributeValue::Integer(_) => ValueType::Integer,
            AttributeValue::Long(_) => ValueType::Long,
            AttributeValue::Double(_) => ValueType::Double,
            AttributeValue::DateTime(_) => ValueType::DateTime,
            AttributeValue::Bytes(_) => ValueType::Bytes,
        }
    }

    /// String payload, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Timestamp payload, if this is a date/time value
    pub fn as_datetime(&self) -> Option<i64> {
        match self {
            AttributeValue::DateTime(secs) => Some(*secs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeType {
    pub id: i32,
    pub type_name: String,
    pub display_name: String,
    pub value_type: ValueType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub attribute_type: AttributeType,
    pub value: AttributeValue,
}

// ============================================================================
// Artifacts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactType {
    pub id: i32,
    pub type_name: String,
    pub display_name: String,
}

/// Artifact header row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub artifact_id: i64,
    /// Object id of the file the artifact was found in
    pub object_id: i64,
    pub artifact_type_id: i32,
}

/// An artifact together with its ordered attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub artifact: Artifact,
    pub attributes: Vec<Attribute>,
}

impl ArtifactRecord {
    pub fn new(artifact: Artifact, attributes: Vec<Attribute>) -> Self {
        Self { artifact, attributes }
    }

    /// First attribute of the given type, if any
    pub fn attribute(&self, attribute_type_id: i32) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.attribute_type.id == attribute_type_id)
    }

    /// String value of the first attribute of the given type
    pub fn attribute_text(&self, attribute_type_id: i32) -> Option<&str> {
        self.attribute(attribute_type_id).and_then(|a| a.value.as_str())
    }
}

// ============================================================================
// Files
// ============================================================================

/// Allocation flag value for unallocated (deleted) file system entries
pub const DIR_FLAG_UNALLOCATED: i32 = 2;

/// Meta type value for directories
pub const META_TYPE_DIRECTORY: i32 = 2;

/// `tsk_files.type` values for block runs that are not real files
pub const FILE_KIND_UNALLOC_BLOCKS: i32 = 1;
pub const FILE_KIND_UNUSED_BLOCKS: i32 = 2;

/// Extensions treated as images when the MIME type is not known
const IMAGE_EXTENSIONS: [&str; 9] = ["jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp", "ico"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub object_id: i64,
    pub data_source_id: i64,
    pub name: String,
    pub parent_path: String,
    /// `/<data source><parent path><name>`
    pub unique_path: String,
    pub extension: Option<String>,
    pub size: i64,
    pub meta_type: i32,
    pub meta_addr: i64,
    pub dir_flags: i32,
    pub mode: i32,
    /// 0 unknown, 1 known, 2 notable; NULL treated as unknown
    pub known: Option<i32>,
    pub md5: Option<String>,
    pub mime_type: Option<String>,
    pub crtime: i64,
    pub mtime: i64,
    pub atime: i64,
    pub ctime: i64,
    /// Sleuth Kit file type (`tsk_files.type`): 0 file system, 1 unallocated
    /// blocks, 2 unused blocks, 5 local, 6 derived, ...
    pub file_kind: i32,
    /// Path of an extracted copy on the examiner's disk
    pub local_path: Option<String>,
}

impl FileRecord {
    pub fn is_deleted(&self) -> bool {
        self.dir_flags == DIR_FLAG_UNALLOCATED
    }

    pub fn is_directory(&self) -> bool {
        self.meta_type == META_TYPE_DIRECTORY
    }

    /// Whether a thumbnail can be shown for this file
    ///
    /// A detected MIME type decides; the extension is only consulted when
    /// detection did not run or gave up.
    pub fn is_image(&self) -> bool {
        if self.is_directory()
            || matches!(self.file_kind, FILE_KIND_UNALLOC_BLOCKS | FILE_KIND_UNUSED_BLOCKS)
        {
            return false;
        }
        match self.mime_type.as_deref() {
            Some(mime) if !mime.is_empty() && mime != "application/octet-stream" => {
                mime.starts_with("image/")
            }
            _ => self
                .extension
                .as_deref()
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())),
        }
    }
}

// ============================================================================
// Tags
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTag {
    pub tag_id: i64,
    pub object_id: i64,
    pub tag_name: String,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactTag {
    pub tag_id: i64,
    pub artifact_id: i64,
    /// Object id of the file the tagged artifact belongs to
    pub object_id: i64,
    pub artifact_type_id: i32,
    pub artifact_type_name: String,
    pub tag_name: String,
    pub comment: String,
}
