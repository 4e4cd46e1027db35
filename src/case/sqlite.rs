//! SQLite case database
//!
//! Reads the subset of the Sleuth Kit `case.db` schema the reports need:
//! - `tsk_objects`, `tsk_image_names`, `data_source_info`
//! - `tsk_files`, `tsk_files_path`
//! - `blackboard_artifact_types`, `blackboard_attribute_types`
//! - `blackboard_artifacts`, `blackboard_attributes`
//! - `tag_names`, `content_tags`, `blackboard_artifact_tags`
//!
//! Existing cases are opened read-only. In-memory and freshly created cases
//! get the same tables (the columns the reports read plus the ones the
//! Sleuth Kit requires to be non-null) and the standard type tables, and
//! expose insert helpers for building fixture cases.

use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use super::ids::{attribute, STANDARD_ARTIFACT_TYPES, STANDARD_ATTRIBUTE_TYPES};
use super::types::*;
use super::{CaseDataSource, CaseError, CaseResult};

/// Case database connection wrapper for thread-safe access
pub struct SqliteCase {
    conn: Mutex<Connection>,
    /// Folder holding `case.db`; relative `tsk_files_path` entries hang off it
    case_dir: Option<PathBuf>,
}

/// Column list shared by every file query; see [`map_file`]
///
/// The data source name is the first image segment for disk images, or the
/// root virtual directory's name for logical file sets.
const FILE_COLUMNS: &str = "f.obj_id, f.data_source_obj_id, f.name, COALESCE(f.parent_path, '/'), \
    (SELECT i.name FROM tsk_image_names AS i WHERE i.obj_id = f.data_source_obj_id ORDER BY i.sequence LIMIT 1), \
    (SELECT d.name FROM tsk_files AS d WHERE d.obj_id = f.data_source_obj_id), \
    f.extension, COALESCE(f.size, 0), COALESCE(f.meta_type, 0), COALESCE(f.meta_addr, 0), \
    COALESCE(f.dir_flags, 0), COALESCE(f.mode, 0), f.known, f.md5, f.mime_type, \
    COALESCE(f.crtime, 0), COALESCE(f.mtime, 0), COALESCE(f.atime, 0), COALESCE(f.ctime, 0), \
    COALESCE(f.type, 0), (SELECT p.path FROM tsk_files_path AS p WHERE p.obj_id = f.obj_id)";

/// `tsk_objects.type` values
const OBJECT_TYPE_IMAGE: i32 = 0;
const OBJECT_TYPE_FILE: i32 = 4;
const OBJECT_TYPE_ARTIFACT: i32 = 5;

// ============================================================================
// Fixture Types
// ============================================================================

/// A file row to insert with [`SqliteCase::add_file`]
#[derive(Debug, Clone, Default)]
pub struct NewFile {
    pub data_source_id: i64,
    pub parent_path: String,
    pub name: String,
    pub extension: Option<String>,
    pub size: i64,
    pub meta_type: i32,
    pub meta_addr: i64,
    pub dir_flags: i32,
    pub mode: i32,
    pub known: Option<i32>,
    pub md5: Option<String>,
    pub mime_type: Option<String>,
    pub crtime: i64,
    pub mtime: i64,
    pub atime: i64,
    pub ctime: i64,
    pub file_kind: i32,
    pub local_path: Option<String>,
}

impl NewFile {
    /// Allocated regular file; the extension is taken from the name
    pub fn new(data_source_id: i64, parent_path: &str, name: &str) -> Self {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty());
        Self {
            data_source_id,
            parent_path: parent_path.to_string(),
            name: name.to_string(),
            extension,
            meta_type: 1,
            dir_flags: 1,
            mode: 0o644,
            ..Default::default()
        }
    }

    pub fn size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    pub fn md5(mut self, md5: &str) -> Self {
        self.md5 = Some(md5.to_string());
        self
    }

    pub fn mime_type(mut self, mime: &str) -> Self {
        self.mime_type = Some(mime.to_string());
        self
    }

    pub fn known(mut self, known: i32) -> Self {
        self.known = Some(known);
        self
    }

    pub fn times(mut self, crtime: i64, mtime: i64, atime: i64, ctime: i64) -> Self {
        self.crtime = crtime;
        self.mtime = mtime;
        self.atime = atime;
        self.ctime = ctime;
        self
    }

    pub fn kind(mut self, file_kind: i32) -> Self {
        self.file_kind = file_kind;
        self
    }

    pub fn local_path(mut self, path: &str) -> Self {
        self.local_path = Some(path.to_string());
        self
    }

    pub fn deleted(mut self) -> Self {
        self.dir_flags = DIR_FLAG_UNALLOCATED;
        self
    }

    pub fn directory(mut self) -> Self {
        self.meta_type = META_TYPE_DIRECTORY;
        self.extension = None;
        self
    }
}

// ============================================================================
// Connection Management
// ============================================================================

impl SqliteCase {
    /// Open an existing case database read-only
    pub fn open(path: impl AsRef<Path>) -> CaseResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CaseError::InvalidData(format!(
                "case database not found: {}",
                path.display()
            )));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
        )?;
        info!(path = %path.display(), "Opened case database");
        Ok(Self { conn: Mutex::new(conn), case_dir: path.parent().map(Path::to_path_buf) })
    }

    /// Create (or upgrade) a writable case database with the standard schema
    pub fn create(path: impl AsRef<Path>) -> CaseResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let case = Self { conn: Mutex::new(conn), case_dir: path.parent().map(Path::to_path_buf) };
        case.create_schema()?;
        info!(path = %path.display(), "Created case database");
        Ok(case)
    }

    /// Empty in-memory case with the standard schema
    pub fn open_in_memory() -> CaseResult<Self> {
        let case = Self { conn: Mutex::new(Connection::open_in_memory()?), case_dir: None };
        case.create_schema()?;
        Ok(case)
    }

    fn conn(&self) -> CaseResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| CaseError::LockPoisoned)
    }

    /// Create all tables if they don't exist and seed the standard types
    pub fn create_schema(&self) -> CaseResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS tsk_objects (
                obj_id INTEGER PRIMARY KEY,
                par_obj_id INTEGER,
                type INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tsk_image_info (
                obj_id INTEGER PRIMARY KEY,
                type INTEGER,
                ssize INTEGER,
                tzone TEXT,
                size INTEGER,
                md5 TEXT,
                display_name TEXT
            );

            CREATE TABLE IF NOT EXISTS tsk_image_names (
                obj_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                sequence INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS data_source_info (
                obj_id INTEGER PRIMARY KEY,
                device_id TEXT NOT NULL,
                time_zone TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tsk_files (
                obj_id INTEGER PRIMARY KEY,
                fs_obj_id INTEGER,
                data_source_obj_id INTEGER NOT NULL,
                attr_type INTEGER,
                attr_id INTEGER,
                name TEXT NOT NULL,
                meta_addr INTEGER,
                meta_seq INTEGER,
                type INTEGER,
                has_layout INTEGER,
                has_path INTEGER,
                dir_type INTEGER,
                meta_type INTEGER,
                dir_flags INTEGER,
                meta_flags INTEGER,
                size INTEGER,
                ctime INTEGER,
                crtime INTEGER,
                atime INTEGER,
                mtime INTEGER,
                mode INTEGER,
                uid INTEGER,
                gid INTEGER,
                md5 TEXT,
                known INTEGER,
                parent_path TEXT,
                mime_type TEXT,
                extension TEXT
            );

            CREATE TABLE IF NOT EXISTS tsk_files_path (
                obj_id INTEGER PRIMARY KEY,
                path TEXT NOT NULL,
                encoding_type INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS blackboard_artifact_types (
                artifact_type_id INTEGER PRIMARY KEY,
                type_name TEXT NOT NULL,
                display_name TEXT
            );

            CREATE TABLE IF NOT EXISTS blackboard_attribute_types (
                attribute_type_id INTEGER PRIMARY KEY,
                type_name TEXT NOT NULL,
                display_name TEXT,
                value_type INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS blackboard_artifacts (
                artifact_id INTEGER PRIMARY KEY,
                obj_id INTEGER NOT NULL,
                artifact_obj_id INTEGER NOT NULL,
                data_source_obj_id INTEGER,
                artifact_type_id INTEGER NOT NULL,
                review_status_id INTEGER NOT NULL DEFAULT 0
            );

            -- Attribute order is insertion (rowid) order
            CREATE TABLE IF NOT EXISTS blackboard_attributes (
                artifact_id INTEGER NOT NULL,
                artifact_type_id INTEGER,
                source TEXT,
                context TEXT,
                attribute_type_id INTEGER NOT NULL,
                value_type INTEGER NOT NULL,
                value_byte BLOB,
                value_text TEXT,
                value_int32 INTEGER,
                value_int64 INTEGER,
                value_double REAL
            );

            CREATE TABLE IF NOT EXISTS tag_names (
                tag_name_id INTEGER PRIMARY KEY,
                display_name TEXT UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                color TEXT NOT NULL DEFAULT 'None',
                knownStatus INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS content_tags (
                tag_id INTEGER PRIMARY KEY,
                obj_id INTEGER NOT NULL,
                tag_name_id INTEGER NOT NULL,
                comment TEXT NOT NULL DEFAULT '',
                begin_byte_offset INTEGER NOT NULL DEFAULT 0,
                end_byte_offset INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS blackboard_artifact_tags (
                tag_id INTEGER PRIMARY KEY,
                artifact_id INTEGER NOT NULL,
                tag_name_id INTEGER NOT NULL,
                comment TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_files_ds ON tsk_files(data_source_obj_id);
            CREATE INDEX IF NOT EXISTS idx_files_md5 ON tsk_files(md5);
            CREATE INDEX IF NOT EXISTS idx_artifacts_type ON blackboard_artifacts(artifact_type_id);
            CREATE INDEX IF NOT EXISTS idx_attributes_artifact ON blackboard_attributes(artifact_id);
            CREATE INDEX IF NOT EXISTS idx_attributes_type ON blackboard_attributes(attribute_type_id);
            CREATE INDEX IF NOT EXISTS idx_artifact_tags_artifact ON blackboard_artifact_tags(artifact_id);
        "#)?;

        let mut artifact_stmt = conn.prepare(
            "INSERT OR IGNORE INTO blackboard_artifact_types (artifact_type_id, type_name, display_name) VALUES (?1, ?2, ?3)",
        )?;
        for (id, type_name, display_name) in STANDARD_ARTIFACT_TYPES {
            artifact_stmt.execute(params![id, type_name, display_name])?;
        }

        let mut attribute_stmt = conn.prepare(
            "INSERT OR IGNORE INTO blackboard_attribute_types (attribute_type_id, type_name, display_name, value_type) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (id, type_name, display_name, value_type) in STANDARD_ATTRIBUTE_TYPES {
            attribute_stmt.execute(params![id, type_name, display_name, value_type.code()])?;
        }

        Ok(())
    }

    /// Resolve a `tsk_files_path` entry against the case folder
    fn resolve_local_path(&self, mut file: FileRecord) -> FileRecord {
        if let (Some(raw), Some(case_dir)) = (file.local_path.as_deref(), self.case_dir.as_deref()) {
            if !raw.is_empty() && !Path::new(raw).is_absolute() {
                let resolved = case_dir.join(raw.replace('\\', "/"));
                file.local_path = Some(resolved.to_string_lossy().into_owned());
            }
        }
        file
    }

    // ========================================================================
    // Fixture Writers
    // ========================================================================

    fn add_object(conn: &Connection, parent: Option<i64>, object_type: i32) -> CaseResult<i64> {
        conn.execute(
            "INSERT INTO tsk_objects (par_obj_id, type) VALUES (?1, ?2)",
            params![parent, object_type],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Add a disk image data source; `image_path` is its first segment
    pub fn add_data_source(&self, image_path: &str) -> CaseResult<i64> {
        let conn = self.conn()?;
        let obj_id = Self::add_object(&conn, None, OBJECT_TYPE_IMAGE)?;
        conn.execute(
            "INSERT INTO tsk_image_info (obj_id, type, ssize, tzone, size) VALUES (?1, 0, 512, 'UTC', 0)",
            params![obj_id],
        )?;
        conn.execute(
            "INSERT INTO tsk_image_names (obj_id, name, sequence) VALUES (?1, ?2, 0)",
            params![obj_id, image_path],
        )?;
        conn.execute(
            "INSERT INTO data_source_info (obj_id, device_id, time_zone) VALUES (?1, ?2, 'UTC')",
            params![obj_id, uuid::Uuid::new_v4().to_string()],
        )?;
        Ok(obj_id)
    }

    pub fn add_file(&self, file: &NewFile) -> CaseResult<i64> {
        let conn = self.conn()?;
        let obj_id = Self::add_object(&conn, Some(file.data_source_id), OBJECT_TYPE_FILE)?;
        conn.execute(
            "INSERT INTO tsk_files (obj_id, data_source_obj_id, name, parent_path, extension, size,
                meta_type, meta_addr, dir_flags, mode, known, md5, mime_type,
                crtime, mtime, atime, ctime, type, has_path)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, 1)",
            params![
                obj_id,
                file.data_source_id,
                file.name,
                file.parent_path,
                file.extension,
                file.size,
                file.meta_type,
                file.meta_addr,
                file.dir_flags,
                file.mode,
                file.known,
                file.md5,
                file.mime_type,
                file.crtime,
                file.mtime,
                file.atime,
                file.ctime,
                file.file_kind,
            ],
        )?;
        if let Some(local_path) = &file.local_path {
            conn.execute(
                "INSERT INTO tsk_files_path (obj_id, path) VALUES (?1, ?2)",
                params![obj_id, local_path],
            )?;
        }
        Ok(obj_id)
    }

    /// Register a non-standard artifact type
    pub fn add_artifact_type(&self, id: i32, type_name: &str, display_name: &str) -> CaseResult<()> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO blackboard_artifact_types (artifact_type_id, type_name, display_name) VALUES (?1, ?2, ?3)",
            params![id, type_name, display_name],
        )?;
        Ok(())
    }

    /// Register a non-standard attribute type
    pub fn add_attribute_type(
        &self,
        id: i32,
        type_name: &str,
        display_name: &str,
        value_type: ValueType,
    ) -> CaseResult<()> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO blackboard_attribute_types (attribute_type_id, type_name, display_name, value_type) VALUES (?1, ?2, ?3, ?4)",
            params![id, type_name, display_name, value_type.code()],
        )?;
        Ok(())
    }

    pub fn add_artifact(&self, object_id: i64, artifact_type_id: i32) -> CaseResult<i64> {
        let conn = self.conn()?;
        let artifact_obj_id = Self::add_object(&conn, Some(object_id), OBJECT_TYPE_ARTIFACT)?;
        conn.execute(
            "INSERT INTO blackboard_artifacts (obj_id, artifact_obj_id, data_source_obj_id, artifact_type_id)
             VALUES (?1, ?2, (SELECT data_source_obj_id FROM tsk_files WHERE obj_id = ?1), ?3)",
            params![object_id, artifact_obj_id, artifact_type_id],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn add_attribute(
        &self,
        artifact_id: i64,
        attribute_type_id: i32,
        value: &AttributeValue,
    ) -> CaseResult<()> {
        let conn = self.conn()?;
        let code = value.value_type().code();
        let sql = "INSERT INTO blackboard_attributes (artifact_id, attribute_type_id, value_type,
                value_text, value_int32, value_int64, value_double, value_byte)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
        match value {
            AttributeValue::String(s) => conn.execute(
                sql,
                params![artifact_id, attribute_type_id, code, s, None::<i32>, None::<i64>, None::<f64>, None::<Vec<u8>>],
            )?,
            AttributeValue::Integer(n) => conn.execute(
                sql,
                params![artifact_id, attribute_type_id, code, None::<String>, n, None::<i64>, None::<f64>, None::<Vec<u8>>],
            )?,
            AttributeValue::Long(n) | AttributeValue::DateTime(n) => conn.execute(
                sql,
                params![artifact_id, attribute_type_id, code, None::<String>, None::<i32>, n, None::<f64>, None::<Vec<u8>>],
            )?,
            AttributeValue::Double(d) => conn.execute(
                sql,
                params![artifact_id, attribute_type_id, code, None::<String>, None::<i32>, None::<i64>, d, None::<Vec<u8>>],
            )?,
            AttributeValue::Bytes(b) => conn.execute(
                sql,
                params![artifact_id, attribute_type_id, code, None::<String>, None::<i32>, None::<i64>, None::<f64>, b],
            )?,
        };
        Ok(())
    }

    /// Get or create a tag name, returning its id
    pub fn add_tag_name(&self, display_name: &str) -> CaseResult<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO tag_names (display_name) VALUES (?1)",
            params![display_name],
        )?;
        let id = conn.query_row(
            "SELECT tag_name_id FROM tag_names WHERE display_name = ?1",
            params![display_name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn tag_content(&self, object_id: i64, tag_name_id: i64, comment: &str) -> CaseResult<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO content_tags (obj_id, tag_name_id, comment) VALUES (?1, ?2, ?3)",
            params![object_id, tag_name_id, comment],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn tag_artifact(&self, artifact_id: i64, tag_name_id: i64, comment: &str) -> CaseResult<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO blackboard_artifact_tags (artifact_id, tag_name_id, comment) VALUES (?1, ?2, ?3)",
            params![artifact_id, tag_name_id, comment],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

// ============================================================================
// Row Decoding
// ============================================================================

/// Last component of an image path, whichever separator it was written with
fn image_file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn map_file(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    let name: String = row.get(2)?;
    let parent_path: String = row.get(3)?;
    let image: Option<String> = row.get(4)?;
    let root_dir: Option<String> = row.get(5)?;
    let data_source = image
        .as_deref()
        .map(image_file_name)
        .or(root_dir.as_deref())
        .unwrap_or("");
    let unique_path = if data_source.is_empty() {
        format!("{}{}", parent_path, name)
    } else {
        format!("/{}{}{}", data_source, parent_path, name)
    };

    Ok(FileRecord {
        object_id: row.get(0)?,
        data_source_id: row.get(1)?,
        name,
        parent_path,
        unique_path,
        extension: row.get(6)?,
        size: row.get(7)?,
        meta_type: row.get(8)?,
        meta_addr: row.get(9)?,
        dir_flags: row.get(10)?,
        mode: row.get(11)?,
        known: row.get(12)?,
        md5: row.get(13)?,
        mime_type: row.get(14)?,
        crtime: row.get(15)?,
        mtime: row.get(16)?,
        atime: row.get(17)?,
        ctime: row.get(18)?,
        file_kind: row.get(19)?,
        local_path: row.get(20)?,
    })
}

/// Raw attribute columns before value decoding
struct RawAttribute {
    type_id: i32,
    type_name: String,
    display_name: String,
    value_type: i32,
    text: Option<String>,
    int32: Option<i32>,
    int64: Option<i64>,
    double: Option<f64>,
    bytes: Option<Vec<u8>>,
}

impl RawAttribute {
    /// `None` for value types this reader does not render (e.g. JSON); the
    /// attribute then reads as absent
    fn decode(self, artifact_id: i64) -> CaseResult<Option<Attribute>> {
        let Some(value_type) = ValueType::from_code(self.value_type) else {
            debug!(
                artifact_id,
                attribute_type = self.type_id,
                value_type = self.value_type,
                "Skipping attribute with unsupported value type"
            );
            return Ok(None);
        };
        let missing = || {
            CaseError::InvalidData(format!(
                "attribute {} of artifact {} has no value",
                self.type_id, artifact_id
            ))
        };

        let value = match value_type {
            ValueType::String => AttributeValue::String(self.text.clone().unwrap_or_default()),
            ValueType::Integer => AttributeValue::Integer(self.int32.ok_or_else(missing)?),
            ValueType::Long => AttributeValue::Long(self.int64.ok_or_else(missing)?),
            ValueType::Double => AttributeValue::Double(self.double.ok_or_else(missing)?),
            ValueType::DateTime => AttributeValue::DateTime(self.int64.ok_or_else(missing)?),
            ValueType::Bytes => AttributeValue::Bytes(self.bytes.clone().unwrap_or_default()),
        };

        let display_name = if !self.display_name.is_empty() {
            self.display_name
        } else if !self.type_name.is_empty() {
            self.type_name.clone()
        } else {
            self.type_id.to_string()
        };

        Ok(Some(Attribute {
            attribute_type: AttributeType {
                id: self.type_id,
                type_name: self.type_name,
                display_name,
                value_type,
            },
            value,
        }))
    }
}

// ============================================================================
// Queries
// ============================================================================

impl CaseDataSource for SqliteCase {
    fn artifact_types_in_use(&self) -> CaseResult<Vec<ArtifactType>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT t.artifact_type_id, t.type_name, COALESCE(t.display_name, t.type_name)
             FROM blackboard_artifact_types AS t
             JOIN blackboard_artifacts AS a ON a.artifact_type_id = t.artifact_type_id
             ORDER BY t.artifact_type_id",
        )?;
        let types = stmt
            .query_map([], |row| {
                Ok(ArtifactType {
                    id: row.get(0)?,
                    type_name: row.get(1)?,
                    display_name: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(types)
    }

    fn artifact_type(&self, type_id: i32) -> CaseResult<Option<ArtifactType>> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                "SELECT artifact_type_id, type_name, COALESCE(display_name, type_name) FROM blackboard_artifact_types WHERE artifact_type_id = ?1",
                params![type_id],
                |row| {
                    Ok(ArtifactType {
                        id: row.get(0)?,
                        type_name: row.get(1)?,
                        display_name: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    fn artifact_count(&self, type_id: i32) -> CaseResult<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM blackboard_artifacts WHERE artifact_type_id = ?1",
            params![type_id],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn artifacts_of_type(&self, type_id: i32) -> CaseResult<Vec<Artifact>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT artifact_id, obj_id, artifact_type_id FROM blackboard_artifacts
             WHERE artifact_type_id = ?1 ORDER BY artifact_id",
        )?;
        let artifacts = stmt
            .query_map(params![type_id], |row| {
                Ok(Artifact {
                    artifact_id: row.get(0)?,
                    object_id: row.get(1)?,
                    artifact_type_id: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(type_id, count = artifacts.len(), "Loaded artifacts");
        Ok(artifacts)
    }

    fn artifact_attributes(&self, artifact_id: i64) -> CaseResult<Vec<Attribute>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT a.attribute_type_id, COALESCE(t.type_name, ''), COALESCE(t.display_name, ''),
                    a.value_type, a.value_text, a.value_int32, a.value_int64, a.value_double, a.value_byte
             FROM blackboard_attributes AS a
             LEFT JOIN blackboard_attribute_types AS t ON t.attribute_type_id = a.attribute_type_id
             WHERE a.artifact_id = ?1
             ORDER BY a.rowid",
        )?;
        let raw = stmt
            .query_map(params![artifact_id], |row| {
                Ok(RawAttribute {
                    type_id: row.get(0)?,
                    type_name: row.get(1)?,
                    display_name: row.get(2)?,
                    value_type: row.get(3)?,
                    text: row.get(4)?,
                    int32: row.get(5)?,
                    int64: row.get(6)?,
                    double: row.get(7)?,
                    bytes: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .filter_map(|r| r.decode(artifact_id).transpose())
            .collect()
    }

    fn artifact_tag_names(&self, artifact_id: i64) -> CaseResult<BTreeSet<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT n.display_name FROM blackboard_artifact_tags AS bt
             JOIN tag_names AS n ON n.tag_name_id = bt.tag_name_id
             WHERE bt.artifact_id = ?1",
        )?;
        let names = stmt
            .query_map(params![artifact_id], |row| row.get::<_, String>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(names)
    }

    fn content_tags(&self) -> CaseResult<Vec<ContentTag>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT ct.tag_id, ct.obj_id, n.display_name, ct.comment
             FROM content_tags AS ct
             JOIN tag_names AS n ON n.tag_name_id = ct.tag_name_id
             ORDER BY ct.tag_id",
        )?;
        let tags = stmt
            .query_map([], |row| {
                Ok(ContentTag {
                    tag_id: row.get(0)?,
                    object_id: row.get(1)?,
                    tag_name: row.get(2)?,
                    comment: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    fn artifact_tags(&self) -> CaseResult<Vec<ArtifactTag>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT bt.tag_id, bt.artifact_id, a.obj_id, a.artifact_type_id,
                    COALESCE(t.display_name, t.type_name, ''), n.display_name, bt.comment
             FROM blackboard_artifact_tags AS bt
             JOIN blackboard_artifacts AS a ON a.artifact_id = bt.artifact_id
             LEFT JOIN blackboard_artifact_types AS t ON t.artifact_type_id = a.artifact_type_id
             JOIN tag_names AS n ON n.tag_name_id = bt.tag_name_id
             ORDER BY bt.tag_id",
        )?;
        let tags = stmt
            .query_map([], |row| {
                Ok(ArtifactTag {
                    tag_id: row.get(0)?,
                    artifact_id: row.get(1)?,
                    object_id: row.get(2)?,
                    artifact_type_id: row.get(3)?,
                    artifact_type_name: row.get(4)?,
                    tag_name: row.get(5)?,
                    comment: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    fn tag_names_in_use(&self) -> CaseResult<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT display_name FROM tag_names
             WHERE tag_name_id IN (
                SELECT tag_name_id FROM content_tags
                UNION SELECT tag_name_id FROM blackboard_artifact_tags
             )
             ORDER BY display_name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn file_by_id(&self, object_id: i64) -> CaseResult<Option<FileRecord>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM tsk_files AS f WHERE f.obj_id = ?1", FILE_COLUMNS);
        let file = conn.query_row(&sql, params![object_id], map_file).optional()?;
        Ok(file.map(|f| self.resolve_local_path(f)))
    }

    fn set_names(&self, artifact_type_id: i32) -> CaseResult<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT att.value_text AS list
             FROM blackboard_attributes AS att, blackboard_artifacts AS art
             WHERE att.attribute_type_id = ?1
               AND art.artifact_type_id = ?2
               AND att.artifact_id = art.artifact_id
             ORDER BY list",
        )?;
        let names = stmt
            .query_map(params![attribute::SET_NAME, artifact_type_id], |row| {
                row.get::<_, Option<String>>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = BTreeSet::new();
        Ok(names
            .into_iter()
            .map(Option::unwrap_or_default)
            .filter(|name| seen.insert(name.clone()))
            .collect())
    }

    fn files_where(&self, clause: &str) -> CaseResult<Vec<FileRecord>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM tsk_files AS f WHERE {}", FILE_COLUMNS, clause);
        let mut stmt = conn.prepare(&sql)?;
        let files = stmt
            .query_map([], map_file)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(clause, count = files.len(), "File query");
        Ok(files.into_iter().map(|f| self.resolve_local_path(f)).collect())
    }

    fn all_files(&self) -> CaseResult<Vec<FileRecord>> {
        self.files_where(&format!("meta_type != {} ORDER BY obj_id", META_TYPE_DIRECTORY))
    }

    fn artifacts_for_domain(&self, domain: &str) -> CaseResult<Vec<ArtifactRecord>> {
        let headers = {
            let conn = self.conn()?;
            let mut stmt = conn.prepare(
                "SELECT DISTINCT art.artifact_id, art.obj_id, art.artifact_type_id
                 FROM blackboard_artifacts AS art
                 JOIN blackboard_attributes AS att ON att.artifact_id = art.artifact_id
                 WHERE att.attribute_type_id = ?1 AND lower(att.value_text) = lower(?2)
                 ORDER BY art.artifact_id",
            )?;
            let rows = stmt
                .query_map(params![attribute::DOMAIN, domain.trim()], |row| {
                    Ok(Artifact {
                        artifact_id: row.get(0)?,
                        object_id: row.get(1)?,
                        artifact_type_id: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        headers.into_iter().map(|a| self.artifact_record(a)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::ids::artifact;

    fn fixture() -> (SqliteCase, i64, i64) {
        let case = SqliteCase::open_in_memory().unwrap();
        let ds = case.add_data_source("image.E01").unwrap();
        let file = case
            .add_file(&NewFile::new(ds, "/Users/alice/", "Bookmarks.db").size(4096).md5("abc"))
            .unwrap();
        (case, ds, file)
    }

    #[test]
    fn test_unique_path() {
        let (case, _, file) = fixture();
        assert_eq!(
            case.file_unique_path(file).unwrap().as_deref(),
            Some("/image.E01/Users/alice/Bookmarks.db")
        );
        assert!(case.file_unique_path(9999).unwrap().is_none());
    }

    #[test]
    fn test_attribute_round_trip_preserves_order() {
        let (case, _, file) = fixture();
        let art = case.add_artifact(file, artifact::WEB_BOOKMARK).unwrap();
        case.add_attribute(art, attribute::URL, &AttributeValue::String("http://x".into())).unwrap();
        case.add_attribute(art, attribute::DATETIME_CREATED, &AttributeValue::DateTime(1_000_000_000)).unwrap();
        case.add_attribute(art, attribute::GEO_LATITUDE, &AttributeValue::Double(1.5)).unwrap();
        case.add_attribute(art, attribute::COUNT, &AttributeValue::Integer(7)).unwrap();
        case.add_attribute(art, 200, &AttributeValue::Bytes(vec![0xde, 0xad])).unwrap();

        let attrs = case.artifact_attributes(art).unwrap();
        assert_eq!(attrs.len(), 5);
        assert_eq!(attrs[0].attribute_type.display_name, "URL");
        assert_eq!(attrs[1].value, AttributeValue::DateTime(1_000_000_000));
        assert_eq!(attrs[2].value, AttributeValue::Double(1.5));
        assert_eq!(attrs[3].value, AttributeValue::Integer(7));
        // Unregistered type falls back to its id
        assert_eq!(attrs[4].attribute_type.display_name, "200");
    }

    #[test]
    fn test_tags_and_set_names() {
        let (case, _, file) = fixture();
        let a1 = case.add_artifact(file, artifact::KEYWORD_HIT).unwrap();
        let a2 = case.add_artifact(file, artifact::KEYWORD_HIT).unwrap();
        case.add_attribute(a1, attribute::SET_NAME, &AttributeValue::String("ListB".into())).unwrap();
        case.add_attribute(a2, attribute::SET_NAME, &AttributeValue::String("ListA".into())).unwrap();

        let evidence = case.add_tag_name("Evidence").unwrap();
        assert_eq!(case.add_tag_name("Evidence").unwrap(), evidence);
        case.tag_artifact(a1, evidence, "look").unwrap();
        case.tag_content(file, evidence, "").unwrap();

        assert_eq!(case.set_names(artifact::KEYWORD_HIT).unwrap(), vec!["ListA", "ListB"]);
        assert!(case.artifact_tag_names(a1).unwrap().contains("Evidence"));
        assert!(case.artifact_tag_names(a2).unwrap().is_empty());
        assert_eq!(case.tag_names_in_use().unwrap(), vec!["Evidence"]);

        let tags = case.artifact_tags().unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].artifact_type_name, "Keyword Hits");
        assert_eq!(case.content_tags().unwrap()[0].object_id, file);
    }

    #[test]
    fn test_all_files_skips_directories() {
        let (case, ds, file) = fixture();
        case.add_file(&NewFile::new(ds, "/", "Users").directory()).unwrap();
        let files = case.all_files().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].object_id, file);
        assert_eq!(files[0].extension.as_deref(), Some("db"));
    }

    #[test]
    fn test_artifacts_for_domain() {
        let (case, _, file) = fixture();
        let art = case.add_artifact(file, artifact::WEB_HISTORY).unwrap();
        case.add_attribute(art, attribute::DOMAIN, &AttributeValue::String("Example.com".into())).unwrap();
        case.add_artifact(file, artifact::WEB_HISTORY).unwrap();

        let found = case.artifacts_for_domain("example.COM").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].artifact.artifact_id, art);
        assert!(case.artifacts_for_domain("other.org").unwrap().is_empty());
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(SqliteCase::open(dir.path().join("missing.db")).is_err());
    }

    #[test]
    fn test_sleuthkit_layout() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("case.db");
        let (file, carved, art) = {
            let case = SqliteCase::create(&path).unwrap();
            let ds = case.add_data_source("C:\\evidence\\disk.E01").unwrap();
            let file = case.add_file(&NewFile::new(ds, "/Users/alice/", "notes.txt")).unwrap();
            let carved = case
                .add_file(&NewFile::new(ds, "/$CarvedFiles/", "f0001.jpg").kind(4).local_path("ModuleOutput\\carved\\f0001.jpg"))
                .unwrap();
            let art = case.add_artifact(file, artifact::WEB_BOOKMARK).unwrap();
            case.add_attribute(art, attribute::URL, &AttributeValue::String("http://x".into())).unwrap();
            (file, carved, art)
        };

        // Rows the way the Sleuth Kit writes them: sparse file columns, JSON attributes
        let raw = Connection::open(&path).unwrap();
        raw.execute(
            "INSERT INTO tsk_files (obj_id, data_source_obj_id, name, type) VALUES (900, 1, '$Unalloc', 3)",
            [],
        )
        .unwrap();
        raw.execute(
            "INSERT INTO blackboard_attributes (artifact_id, attribute_type_id, value_type, value_text)
             VALUES (?1, 500, 6, '{\"a\": 1}')",
            params![art],
        )
        .unwrap();
        drop(raw);

        let case = SqliteCase::open(&path).unwrap();
        assert_eq!(
            case.file_unique_path(file).unwrap().as_deref(),
            Some("/disk.E01/Users/alice/notes.txt")
        );
        let carved = case.file_by_id(carved).unwrap().unwrap();
        assert_eq!(carved.file_kind, 4);
        assert_eq!(
            carved.local_path.map(PathBuf::from),
            Some(dir.path().join("ModuleOutput").join("carved").join("f0001.jpg"))
        );

        let sparse = case.file_by_id(900).unwrap().unwrap();
        assert_eq!(sparse.size, 0);
        assert_eq!(sparse.parent_path, "/");

        // The JSON attribute reads as absent; the rest of the artifact survives
        let attrs = case.artifact_attributes(art).unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].value, AttributeValue::String("http://x".into()));
    }

    #[test]
    fn test_create_then_open_read_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("case.db");
        {
            let case = SqliteCase::create(&path).unwrap();
            let ds = case.add_data_source("disk").unwrap();
            let file = case.add_file(&NewFile::new(ds, "/", "a.txt")).unwrap();
            case.add_artifact(file, artifact::WEB_COOKIE).unwrap();
        }
        let case = SqliteCase::open(&path).unwrap();
        let types = case.artifact_types_in_use().unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].display_name, "Web Cookies");
        assert_eq!(case.artifact_count(artifact::WEB_COOKIE).unwrap(), 1);
    }
}
