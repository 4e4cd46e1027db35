//! Column schemas per artifact type
//!
//! Every artifact type the reports know about has a fixed, ordered column
//! layout defined once in [`SCHEMAS`]: the header and the value binding sit
//! side by side. Types without an entry get a generic layout built from the
//! attribute types actually present. Every layout ends with a "Tags" column.

use std::collections::BTreeMap;

use crate::case::ids::{artifact, attribute};
use crate::case::ArtifactRecord;

/// Where a column's cell value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnSource {
    /// First attribute of this type on the artifact
    Attribute(i32),
    /// Unique path of the file the artifact belongs to
    SourceFile,
    /// The attribute if present, otherwise the source file path
    AttributeOrSourceFile(i32),
    FileName,
    /// File extension, without the dot
    FileExtension,
    FileMimeType,
    FileSize,
    /// Tag display names joined with ", "
    Tags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub header: String,
    pub source: ColumnSource,
}

impl ColumnSpec {
    pub fn new(header: impl Into<String>, source: ColumnSource) -> Self {
        Self { header: header.into(), source }
    }
}

pub const SOURCE_FILE_HEADER: &str = "Source File";
pub const TAGS_HEADER: &str = "Tags";

use ColumnSource::{
    Attribute as Attr, AttributeOrSourceFile, FileExtension, FileMimeType, FileName, FileSize,
    SourceFile,
};

type Layout = &'static [(&'static str, ColumnSource)];

const GPS_PLACE: Layout = &[
    ("Latitude", Attr(attribute::GEO_LATITUDE)),
    ("Longitude", Attr(attribute::GEO_LONGITUDE)),
    ("Altitude", Attr(attribute::GEO_ALTITUDE)),
    ("Name", Attr(attribute::NAME)),
    ("Location/Address", Attr(attribute::LOCATION)),
    ("Date/Time", Attr(attribute::DATETIME)),
    (SOURCE_FILE_HEADER, SourceFile),
];

/// Column layouts by artifact type id, without the trailing tags column
pub static SCHEMAS: &[(i32, Layout)] = &[
    (artifact::WEB_BOOKMARK, &[
        ("URL", Attr(attribute::URL)),
        ("Title", Attr(attribute::TITLE)),
        ("Date Created", Attr(attribute::DATETIME_CREATED)),
        ("Program", Attr(attribute::PROG_NAME)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::WEB_COOKIE, &[
        ("URL", Attr(attribute::URL)),
        ("Date/Time", Attr(attribute::DATETIME)),
        ("Name", Attr(attribute::NAME)),
        ("Value", Attr(attribute::VALUE)),
        ("Program", Attr(attribute::PROG_NAME)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::WEB_HISTORY, &[
        ("URL", Attr(attribute::URL)),
        ("Date Accessed", Attr(attribute::DATETIME_ACCESSED)),
        ("Referrer", Attr(attribute::REFERRER)),
        ("Title", Attr(attribute::TITLE)),
        ("Program", Attr(attribute::PROG_NAME)),
        ("URL Domain Decoded", Attr(attribute::URL_DECODED)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::WEB_DOWNLOAD, &[
        ("Destination", Attr(attribute::PATH)),
        ("Source URL", Attr(attribute::URL)),
        ("Date Accessed", Attr(attribute::DATETIME_ACCESSED)),
        ("Program", Attr(attribute::PROG_NAME)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::RECENT_OBJECT, &[
        ("Path", Attr(attribute::PATH)),
        ("Date/Time", Attr(attribute::DATETIME)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::INSTALLED_PROG, &[
        ("Program Name", Attr(attribute::PROG_NAME)),
        ("Install Date/Time", Attr(attribute::DATETIME)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::KEYWORD_HIT, &[
        ("Preview", Attr(attribute::KEYWORD_PREVIEW)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::HASHSET_HIT, &[
        ("File", SourceFile),
        ("Size", FileSize),
    ]),
    (artifact::DEVICE_ATTACHED, &[
        ("Device Make", Attr(attribute::DEVICE_MAKE)),
        ("Device Model", Attr(attribute::DEVICE_MODEL)),
        ("Device ID", Attr(attribute::DEVICE_ID)),
        ("Date/Time", Attr(attribute::DATETIME)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::WEB_SEARCH_QUERY, &[
        ("Text", Attr(attribute::TEXT)),
        ("Domain", Attr(attribute::DOMAIN)),
        ("Date Accessed", Attr(attribute::DATETIME_ACCESSED)),
        ("Program Name", Attr(attribute::PROG_NAME)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::METADATA_EXIF, &[
        ("Date Taken", Attr(attribute::DATETIME_CREATED)),
        ("Device Manufacturer", Attr(attribute::DEVICE_MAKE)),
        ("Device Model", Attr(attribute::DEVICE_MODEL)),
        ("Latitude", Attr(attribute::GEO_LATITUDE)),
        ("Longitude", Attr(attribute::GEO_LONGITUDE)),
        ("Altitude", Attr(attribute::GEO_ALTITUDE)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::CONTACT, &[
        ("Person Name", Attr(attribute::NAME)),
        ("Phone Number", Attr(attribute::PHONE_NUMBER)),
        ("Phone Number (Home)", Attr(attribute::PHONE_NUMBER_HOME)),
        ("Phone Number (Office)", Attr(attribute::PHONE_NUMBER_OFFICE)),
        ("Phone Number (Mobile)", Attr(attribute::PHONE_NUMBER_MOBILE)),
        ("Email", Attr(attribute::EMAIL)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::MESSAGE, &[
        ("Message Type", Attr(attribute::MESSAGE_TYPE)),
        ("Direction", Attr(attribute::DIRECTION)),
        ("Read", Attr(attribute::READ_STATUS)),
        ("Date/Time", Attr(attribute::DATETIME)),
        ("From Phone Number", Attr(attribute::PHONE_NUMBER_FROM)),
        ("From Email", Attr(attribute::EMAIL_FROM)),
        ("To Phone Number", Attr(attribute::PHONE_NUMBER_TO)),
        ("To Email", Attr(attribute::EMAIL_TO)),
        ("Subject", Attr(attribute::SUBJECT)),
        ("Text", Attr(attribute::TEXT)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::CALLLOG, &[
        ("Person Name", Attr(attribute::NAME)),
        ("From Phone Number", Attr(attribute::PHONE_NUMBER_FROM)),
        ("To Phone Number", Attr(attribute::PHONE_NUMBER_TO)),
        ("Date/Time", Attr(attribute::DATETIME_START)),
        ("Direction", Attr(attribute::DIRECTION)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::CALENDAR_ENTRY, &[
        ("Calendar Entry Type", Attr(attribute::CALENDAR_ENTRY_TYPE)),
        ("Description", Attr(attribute::DESCRIPTION)),
        ("Start Date/Time", Attr(attribute::DATETIME_START)),
        ("End Date/Time", Attr(attribute::DATETIME_END)),
        ("Location", Attr(attribute::LOCATION)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::SPEED_DIAL_ENTRY, &[
        ("Short Cut", Attr(attribute::SHORTCUT)),
        ("Person Name", Attr(attribute::NAME_PERSON)),
        ("Phone Number", Attr(attribute::PHONE_NUMBER)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::BLUETOOTH_PAIRING, &[
        ("Device Name", Attr(attribute::DEVICE_NAME)),
        ("Device Address", Attr(attribute::DEVICE_ID)),
        ("Date/Time", Attr(attribute::DATETIME)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::GPS_TRACKPOINT, &[
        ("Latitude", Attr(attribute::GEO_LATITUDE)),
        ("Longitude", Attr(attribute::GEO_LONGITUDE)),
        ("Date/Time", Attr(attribute::DATETIME)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::GPS_BOOKMARK, GPS_PLACE),
    (artifact::GPS_LAST_KNOWN_LOCATION, GPS_PLACE),
    (artifact::GPS_SEARCH, GPS_PLACE),
    (artifact::SERVICE_ACCOUNT, &[
        ("Category", Attr(attribute::CATEGORY)),
        ("User ID", Attr(attribute::USER_ID)),
        ("Password", Attr(attribute::PASSWORD)),
        ("Person Name", Attr(attribute::NAME)),
        ("App Name", Attr(attribute::PROG_NAME)),
        ("URL", Attr(attribute::URL)),
        ("App Path", Attr(attribute::PATH)),
        ("Description", Attr(attribute::DESCRIPTION)),
        ("Reply To Address", Attr(attribute::EMAIL_REPLYTO)),
        ("Mail Server", Attr(attribute::SERVER_NAME)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::TOOL_OUTPUT, &[
        ("Program Name", Attr(attribute::PROG_NAME)),
        ("Text", Attr(attribute::TEXT)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::ENCRYPTION_DETECTED, &[
        ("Name", Attr(attribute::NAME)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::EXT_MISMATCH_DETECTED, &[
        ("File", FileName),
        ("Extension", FileExtension),
        ("MIME Type", FileMimeType),
        ("Path", SourceFile),
    ]),
    (artifact::OS_INFO, &[
        ("Processor Architecture", Attr(attribute::PROCESSOR_ARCHITECTURE)),
        ("Operating System", Attr(attribute::PROG_NAME)),
        ("Install Date", Attr(attribute::DATETIME)),
        (SOURCE_FILE_HEADER, SourceFile),
    ]),
    (artifact::EMAIL_MSG, &[
        ("E-Mail To", Attr(attribute::EMAIL_TO)),
        ("E-Mail From", Attr(attribute::EMAIL_FROM)),
        ("Subject", Attr(attribute::SUBJECT)),
        ("Date Sent", Attr(attribute::DATETIME_SENT)),
        ("Date Received", Attr(attribute::DATETIME_RCVD)),
        ("Path", Attr(attribute::PATH)),
        ("CC", Attr(attribute::EMAIL_CC)),
        ("BCC", Attr(attribute::EMAIL_BCC)),
        ("Message ID", Attr(attribute::MSG_ID)),
    ]),
    (artifact::INTERESTING_FILE_HIT, &[
        ("Set Name", Attr(attribute::SET_NAME)),
        ("Category", Attr(attribute::CATEGORY)),
        ("Path", AttributeOrSourceFile(attribute::PATH)),
    ]),
    (artifact::GPS_ROUTE, &[
        ("Category", Attr(attribute::CATEGORY)),
        ("Date/Time", Attr(attribute::DATETIME)),
        ("Latitude End", Attr(attribute::GEO_LATITUDE_END)),
        ("Longitude End", Attr(attribute::GEO_LONGITUDE_END)),
        ("Latitude Start", Attr(attribute::GEO_LATITUDE_START)),
        ("Longitude Start", Attr(attribute::GEO_LONGITUDE_START)),
        ("Name", Attr(attribute::NAME)),
        ("Location", Attr(attribute::LOCATION)),
        ("Program", Attr(attribute::PROG_NAME)),
    ]),
    (artifact::INTERESTING_ARTIFACT_HIT, &[
        ("Set Name", Attr(attribute::SET_NAME)),
        ("Associated Artifact", Attr(attribute::ASSOCIATED_ARTIFACT)),
        ("Program", Attr(attribute::PROG_NAME)),
    ]),
    (artifact::PROG_RUN, &[
        ("Program", Attr(attribute::PROG_NAME)),
        ("Associated Artifact", Attr(attribute::ASSOCIATED_ARTIFACT)),
        ("Date/Time", Attr(attribute::DATETIME)),
        ("Count", Attr(attribute::COUNT)),
    ]),
    (artifact::OS_ACCOUNT, &[
        ("User Name", Attr(attribute::USER_NAME)),
        ("User ID", Attr(attribute::USER_ID)),
    ]),
    (artifact::REMOTE_DRIVE, &[
        ("Local Path", Attr(attribute::LOCAL_PATH)),
        ("Remote Path", Attr(attribute::REMOTE_PATH)),
    ]),
];

fn layout_for(artifact_type_id: i32) -> Option<Layout> {
    SCHEMAS
        .iter()
        .find(|(id, _)| *id == artifact_type_id)
        .map(|(_, layout)| *layout)
}

pub fn has_defined_schema(artifact_type_id: i32) -> bool {
    layout_for(artifact_type_id).is_some()
}

/// Ordered columns for one artifact type, tags column included
///
/// `artifacts` is only consulted for types without a defined layout.
pub fn columns_for(artifact_type_id: i32, artifacts: &[ArtifactRecord]) -> Vec<ColumnSpec> {
    let mut columns: Vec<ColumnSpec> = match layout_for(artifact_type_id) {
        Some(layout) => layout
            .iter()
            .map(|(header, source)| ColumnSpec::new(*header, *source))
            .collect(),
        None => generic_columns(artifacts),
    };
    columns.push(ColumnSpec::new(TAGS_HEADER, ColumnSource::Tags));
    columns
}

/// One column per attribute type present, by type id, then the source file
fn generic_columns(artifacts: &[ArtifactRecord]) -> Vec<ColumnSpec> {
    let mut present: BTreeMap<i32, &str> = BTreeMap::new();
    for record in artifacts {
        for attr in &record.attributes {
            present
                .entry(attr.attribute_type.id)
                .or_insert(attr.attribute_type.display_name.as_str());
        }
    }

    present
        .into_iter()
        .map(|(id, header)| ColumnSpec::new(header, Attr(id)))
        .chain(std::iter::once(ColumnSpec::new(SOURCE_FILE_HEADER, SourceFile)))
        .collect()
}

pub fn headers(columns: &[ColumnSpec]) -> Vec<String> {
    columns.iter().map(|c| c.header.clone()).collect()
}
