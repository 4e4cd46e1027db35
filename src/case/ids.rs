//! Standard artifact and attribute type identifiers
//!
//! These match the ids a Sleuth Kit case database seeds into its
//! `blackboard_artifact_types` and `blackboard_attribute_types` tables.

use super::types::ValueType;

/// Standard artifact type ids
pub mod artifact {
    pub const GEN_INFO: i32 = 1;
    pub const WEB_BOOKMARK: i32 = 2;
    pub const WEB_COOKIE: i32 = 3;
    pub const WEB_HISTORY: i32 = 4;
    pub const WEB_DOWNLOAD: i32 = 5;
    pub const RECENT_OBJECT: i32 = 6;
    pub const GPS_TRACKPOINT: i32 = 7;
    pub const INSTALLED_PROG: i32 = 8;
    pub const KEYWORD_HIT: i32 = 9;
    pub const HASHSET_HIT: i32 = 10;
    pub const DEVICE_ATTACHED: i32 = 11;
    pub const INTERESTING_FILE_HIT: i32 = 12;
    pub const EMAIL_MSG: i32 = 13;
    pub const EXTRACTED_TEXT: i32 = 14;
    pub const WEB_SEARCH_QUERY: i32 = 15;
    pub const METADATA_EXIF: i32 = 16;
    pub const TAG_FILE: i32 = 17;
    pub const TAG_ARTIFACT: i32 = 18;
    pub const OS_INFO: i32 = 19;
    pub const OS_ACCOUNT: i32 = 20;
    pub const SERVICE_ACCOUNT: i32 = 21;
    pub const TOOL_OUTPUT: i32 = 22;
    pub const CONTACT: i32 = 23;
    pub const MESSAGE: i32 = 24;
    pub const CALLLOG: i32 = 25;
    pub const CALENDAR_ENTRY: i32 = 26;
    pub const SPEED_DIAL_ENTRY: i32 = 27;
    pub const BLUETOOTH_PAIRING: i32 = 28;
    pub const GPS_BOOKMARK: i32 = 29;
    pub const GPS_LAST_KNOWN_LOCATION: i32 = 30;
    pub const GPS_SEARCH: i32 = 31;
    pub const PROG_RUN: i32 = 32;
    pub const ENCRYPTION_DETECTED: i32 = 33;
    pub const EXT_MISMATCH_DETECTED: i32 = 34;
    pub const INTERESTING_ARTIFACT_HIT: i32 = 35;
    pub const GPS_ROUTE: i32 = 36;
    pub const REMOTE_DRIVE: i32 = 37;
}

/// Standard attribute type ids
pub mod attribute {
    pub const URL: i32 = 1;
    pub const DATETIME: i32 = 2;
    pub const NAME: i32 = 3;
    pub const PROG_NAME: i32 = 4;
    pub const VALUE: i32 = 6;
    pub const PATH: i32 = 8;
    pub const KEYWORD: i32 = 10;
    pub const KEYWORD_PREVIEW: i32 = 12;
    pub const USER_NAME: i32 = 14;
    pub const DOMAIN: i32 = 15;
    pub const PASSWORD: i32 = 16;
    pub const NAME_PERSON: i32 = 17;
    pub const DEVICE_MODEL: i32 = 18;
    pub const DEVICE_MAKE: i32 = 19;
    pub const DEVICE_ID: i32 = 20;
    pub const EMAIL: i32 = 21;
    pub const TEXT: i32 = 26;
    pub const REFERRER: i32 = 32;
    pub const DATETIME_ACCESSED: i32 = 33;
    pub const PHONE_NUMBER: i32 = 35;
    pub const SET_NAME: i32 = 37;
    pub const EMAIL_TO: i32 = 41;
    pub const EMAIL_CC: i32 = 42;
    pub const EMAIL_BCC: i32 = 43;
    pub const EMAIL_FROM: i32 = 44;
    pub const MSG_ID: i32 = 48;
    pub const DATETIME_RCVD: i32 = 50;
    pub const DATETIME_SENT: i32 = 51;
    pub const SUBJECT: i32 = 52;
    pub const TITLE: i32 = 53;
    pub const GEO_LATITUDE: i32 = 54;
    pub const GEO_LONGITUDE: i32 = 55;
    pub const GEO_ALTITUDE: i32 = 57;
    pub const URL_DECODED: i32 = 67;
    pub const DATETIME_CREATED: i32 = 68;
    pub const DATETIME_MODIFIED: i32 = 69;
    pub const PROCESSOR_ARCHITECTURE: i32 = 70;
    pub const USER_ID: i32 = 72;
    pub const DESCRIPTION: i32 = 73;
    pub const MESSAGE_TYPE: i32 = 74;
    pub const PHONE_NUMBER_HOME: i32 = 75;
    pub const PHONE_NUMBER_MOBILE: i32 = 76;
    pub const PHONE_NUMBER_OFFICE: i32 = 77;
    pub const COUNT: i32 = 79;
    pub const ASSOCIATED_ARTIFACT: i32 = 83;
    pub const GEO_LATITUDE_START: i32 = 85;
    pub const GEO_LATITUDE_END: i32 = 86;
    pub const GEO_LONGITUDE_START: i32 = 87;
    pub const GEO_LONGITUDE_END: i32 = 88;
    pub const READ_STATUS: i32 = 89;
    pub const LOCATION: i32 = 90;
    pub const CATEGORY: i32 = 91;
    pub const DATETIME_START: i32 = 92;
    pub const DATETIME_END: i32 = 93;
    pub const REMOTE_PATH: i32 = 94;
    pub const LOCAL_PATH: i32 = 95;
    pub const PHONE_NUMBER_FROM: i32 = 96;
    pub const PHONE_NUMBER_TO: i32 = 97;
    pub const DIRECTION: i32 = 98;
    pub const EMAIL_REPLYTO: i32 = 99;
    pub const SERVER_NAME: i32 = 100;
    pub const SHORTCUT: i32 = 101;
    pub const DEVICE_NAME: i32 = 102;
    pub const CALENDAR_ENTRY_TYPE: i32 = 103;
}

/// (id, type name, display name)
pub const STANDARD_ARTIFACT_TYPES: &[(i32, &str, &str)] = &[
    (artifact::GEN_INFO, "TSK_GEN_INFO", "General Info"),
    (artifact::WEB_BOOKMARK, "TSK_WEB_BOOKMARK", "Web Bookmarks"),
    (artifact::WEB_COOKIE, "TSK_WEB_COOKIE", "Web Cookies"),
    (artifact::WEB_HISTORY, "TSK_WEB_HISTORY", "Web History"),
    (artifact::WEB_DOWNLOAD, "TSK_WEB_DOWNLOAD", "Web Downloads"),
    (artifact::RECENT_OBJECT, "TSK_RECENT_OBJECT", "Recent Documents"),
    (artifact::GPS_TRACKPOINT, "TSK_GPS_TRACKPOINT", "GPS Trackpoints"),
    (artifact::INSTALLED_PROG, "TSK_INSTALLED_PROG", "Installed Programs"),
    (artifact::KEYWORD_HIT, "TSK_KEYWORD_HIT", "Keyword Hits"),
    (artifact::HASHSET_HIT, "TSK_HASHSET_HIT", "Hashset Hits"),
    (artifact::DEVICE_ATTACHED, "TSK_DEVICE_ATTACHED", "Devices Attached"),
    (artifact::INTERESTING_FILE_HIT, "TSK_INTERESTING_FILE_HIT", "Interesting Files"),
    (artifact::EMAIL_MSG, "TSK_EMAIL_MSG", "E-Mail Messages"),
    (artifact::EXTRACTED_TEXT, "TSK_EXTRACTED_TEXT", "Extracted Text"),
    (artifact::WEB_SEARCH_QUERY, "TSK_WEB_SEARCH_QUERY", "Web Search"),
    (artifact::METADATA_EXIF, "TSK_METADATA_EXIF", "EXIF Metadata"),
    (artifact::TAG_FILE, "TSK_TAG_FILE", "Tagged Files"),
    (artifact::TAG_ARTIFACT, "TSK_TAG_ARTIFACT", "Tagged Results"),
    (artifact::OS_INFO, "TSK_OS_INFO", "Operating System Information"),
    (artifact::OS_ACCOUNT, "TSK_OS_ACCOUNT", "Operating System User Account"),
    (artifact::SERVICE_ACCOUNT, "TSK_SERVICE_ACCOUNT", "Web Accounts"),
    (artifact::TOOL_OUTPUT, "TSK_TOOL_OUTPUT", "Raw Tool Output"),
    (artifact::CONTACT, "TSK_CONTACT", "Contacts"),
    (artifact::MESSAGE, "TSK_MESSAGE", "Messages"),
    (artifact::CALLLOG, "TSK_CALLLOG", "Call Logs"),
    (artifact::CALENDAR_ENTRY, "TSK_CALENDAR_ENTRY", "Calendar Entries"),
    (artifact::SPEED_DIAL_ENTRY, "TSK_SPEED_DIAL_ENTRY", "Speed Dial Entries"),
    (artifact::BLUETOOTH_PAIRING, "TSK_BLUETOOTH_PAIRING", "Bluetooth Pairings"),
    (artifact::GPS_BOOKMARK, "TSK_GPS_BOOKMARK", "GPS Bookmarks"),
    (artifact::GPS_LAST_KNOWN_LOCATION, "TSK_GPS_LAST_KNOWN_LOCATION", "GPS Last Known Location"),
    (artifact::GPS_SEARCH, "TSK_GPS_SEARCH", "GPS Searches"),
    (artifact::PROG_RUN, "TSK_PROG_RUN", "Run Programs"),
    (artifact::ENCRYPTION_DETECTED, "TSK_ENCRYPTION_DETECTED", "Encryption Detected"),
    (artifact::EXT_MISMATCH_DETECTED, "TSK_EXT_MISMATCH_DETECTED", "Extension Mismatch Detected"),
    (artifact::INTERESTING_ARTIFACT_HIT, "TSK_INTERESTING_ARTIFACT_HIT", "Interesting Results"),
    (artifact::GPS_ROUTE, "TSK_GPS_ROUTE", "GPS Route"),
    (artifact::REMOTE_DRIVE, "TSK_REMOTE_DRIVE", "Remote Drive"),
];

/// (id, type name, display name, value type)
pub const STANDARD_ATTRIBUTE_TYPES: &[(i32, &str, &str, ValueType)] = &[
    (attribute::URL, "TSK_URL", "URL", ValueType::String),
    (attribute::DATETIME, "TSK_DATETIME", "Date/Time", ValueType::DateTime),
    (attribute::NAME, "TSK_NAME", "Name", ValueType::String),
    (attribute::PROG_NAME, "TSK_PROG_NAME", "Program Name", ValueType::String),
    (attribute::VALUE, "TSK_VALUE", "Value", ValueType::String),
    (attribute::PATH, "TSK_PATH", "Path", ValueType::String),
    (attribute::KEYWORD, "TSK_KEYWORD", "Keyword", ValueType::String),
    (attribute::KEYWORD_PREVIEW, "TSK_KEYWORD_PREVIEW", "Keyword Preview", ValueType::String),
    (attribute::USER_NAME, "TSK_USER_NAME", "User Name", ValueType::String),
    (attribute::DOMAIN, "TSK_DOMAIN", "Domain", ValueType::String),
    (attribute::PASSWORD, "TSK_PASSWORD", "Password", ValueType::String),
    (attribute::NAME_PERSON, "TSK_NAME_PERSON", "Person Name", ValueType::String),
    (attribute::DEVICE_MODEL, "TSK_DEVICE_MODEL", "Device Model", ValueType::String),
    (attribute::DEVICE_MAKE, "TSK_DEVICE_MAKE", "Device Make", ValueType::String),
    (attribute::DEVICE_ID, "TSK_DEVICE_ID", "Device ID", ValueType::String),
    (attribute::EMAIL, "TSK_EMAIL", "Email", ValueType::String),
    (attribute::TEXT, "TSK_TEXT", "Text", ValueType::String),
    (attribute::REFERRER, "TSK_REFERRER", "Referrer URL", ValueType::String),
    (attribute::DATETIME_ACCESSED, "TSK_DATETIME_ACCESSED", "Date Accessed", ValueType::DateTime),
    (attribute::PHONE_NUMBER, "TSK_PHONE_NUMBER", "Phone Number", ValueType::String),
    (attribute::SET_NAME, "TSK_SET_NAME", "Set Name", ValueType::String),
    (attribute::EMAIL_TO, "TSK_EMAIL_TO", "E-Mail To", ValueType::String),
    (attribute::EMAIL_CC, "TSK_EMAIL_CC", "CC", ValueType::String),
    (attribute::EMAIL_BCC, "TSK_EMAIL_BCC", "BCC", ValueType::String),
    (attribute::EMAIL_FROM, "TSK_EMAIL_FROM", "E-Mail From", ValueType::String),
    (attribute::MSG_ID, "TSK_MSG_ID", "Message ID", ValueType::String),
    (attribute::DATETIME_RCVD, "TSK_DATETIME_RCVD", "Date Received", ValueType::DateTime),
    (attribute::DATETIME_SENT, "TSK_DATETIME_SENT", "Date Sent", ValueType::DateTime),
    (attribute::SUBJECT, "TSK_SUBJECT", "Subject", ValueType::String),
    (attribute::TITLE, "TSK_TITLE", "Title", ValueType::String),
    (attribute::GEO_LATITUDE, "TSK_GEO_LATITUDE", "Latitude", ValueType::Double),
    (attribute::GEO_LONGITUDE, "TSK_GEO_LONGITUDE", "Longitude", ValueType::Double),
    (attribute::GEO_ALTITUDE, "TSK_GEO_ALTITUDE", "Altitude", ValueType::Double),
    (attribute::URL_DECODED, "TSK_URL_DECODED", "Decoded URL", ValueType::String),
    (attribute::DATETIME_CREATED, "TSK_DATETIME_CREATED", "Date Created", ValueType::DateTime),
    (attribute::DATETIME_MODIFIED, "TSK_DATETIME_MODIFIED", "Date Modified", ValueType::DateTime),
    (attribute::PROCESSOR_ARCHITECTURE, "TSK_PROCESSOR_ARCHITECTURE", "Processor Architecture", ValueType::String),
    (attribute::USER_ID, "TSK_USER_ID", "User ID", ValueType::String),
    (attribute::DESCRIPTION, "TSK_DESCRIPTION", "Description", ValueType::String),
    (attribute::MESSAGE_TYPE, "TSK_MESSAGE_TYPE", "Message Type", ValueType::String),
    (attribute::PHONE_NUMBER_HOME, "TSK_PHONE_NUMBER_HOME", "Phone Number (Home)", ValueType::String),
    (attribute::PHONE_NUMBER_MOBILE, "TSK_PHONE_NUMBER_MOBILE", "Phone Number (Mobile)", ValueType::String),
    (attribute::PHONE_NUMBER_OFFICE, "TSK_PHONE_NUMBER_OFFICE", "Phone Number (Office)", ValueType::String),
    (attribute::COUNT, "TSK_COUNT", "Count", ValueType::Integer),
    (attribute::ASSOCIATED_ARTIFACT, "TSK_ASSOCIATED_ARTIFACT", "Associated Artifact", ValueType::Long),
    (attribute::GEO_LATITUDE_START, "TSK_GEO_LATITUDE_START", "Starting Latitude", ValueType::Double),
    (attribute::GEO_LATITUDE_END, "TSK_GEO_LATITUDE_END", "Ending Latitude", ValueType::Double),
    (attribute::GEO_LONGITUDE_START, "TSK_GEO_LONGITUDE_START", "Starting Longitude", ValueType::Double),
    (attribute::GEO_LONGITUDE_END, "TSK_GEO_LONGITUDE_END", "Ending Longitude", ValueType::Double),
    (attribute::READ_STATUS, "TSK_READ_STATUS", "Read", ValueType::Integer),
    (attribute::LOCATION, "TSK_LOCATION", "Location", ValueType::String),
    (attribute::CATEGORY, "TSK_CATEGORY", "Category", ValueType::String),
    (attribute::DATETIME_START, "TSK_DATETIME_START", "Start Date/Time", ValueType::DateTime),
    (attribute::DATETIME_END, "TSK_DATETIME_END", "End Date/Time", ValueType::DateTime),
    (attribute::REMOTE_PATH, "TSK_REMOTE_PATH", "Remote Path", ValueType::String),
    (attribute::LOCAL_PATH, "TSK_LOCAL_PATH", "Local Path", ValueType::String),
    (attribute::PHONE_NUMBER_FROM, "TSK_PHONE_NUMBER_FROM", "From Phone Number", ValueType::String),
    (attribute::PHONE_NUMBER_TO, "TSK_PHONE_NUMBER_TO", "To Phone Number", ValueType::String),
    (attribute::DIRECTION, "TSK_DIRECTION", "Direction", ValueType::String),
    (attribute::EMAIL_REPLYTO, "TSK_EMAIL_REPLYTO", "Reply To", ValueType::String),
    (attribute::SERVER_NAME, "TSK_SERVER_NAME", "Server Name", ValueType::String),
    (attribute::SHORTCUT, "TSK_SHORTCUT", "Short Cut", ValueType::String),
    (attribute::DEVICE_NAME, "TSK_DEVICE_NAME", "Device Name", ValueType::String),
    (attribute::CALENDAR_ENTRY_TYPE, "TSK_CALENDAR_ENTRY_TYPE", "Calendar Entry Type", ValueType::String),
];

/// Look up a standard artifact type by its `TSK_*` name or display name
pub fn artifact_type_id_by_name(name: &str) -> Option<i32> {
    STANDARD_ARTIFACT_TYPES
        .iter()
        .find(|(_, type_name, display)| {
            type_name.eq_ignore_ascii_case(name) || display.eq_ignore_ascii_case(name)
        })
        .map(|(id, _, _)| *id)
}

/// Display name of a standard artifact type
pub fn artifact_display_name(type_id: i32) -> Option<&'static str> {
    STANDARD_ARTIFACT_TYPES
        .iter()
        .find(|(id, _, _)| *id == type_id)
        .map(|(_, _, display)| *display)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_unique() {
        let ids: HashSet<i32> = STANDARD_ARTIFACT_TYPES.iter().map(|t| t.0).collect();
        assert_eq!(ids.len(), STANDARD_ARTIFACT_TYPES.len());
        let ids: HashSet<i32> = STANDARD_ATTRIBUTE_TYPES.iter().map(|t| t.0).collect();
        assert_eq!(ids.len(), STANDARD_ATTRIBUTE_TYPES.len());
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(artifact_type_id_by_name("TSK_WEB_BOOKMARK"), Some(artifact::WEB_BOOKMARK));
        assert_eq!(artifact_type_id_by_name("keyword hits"), Some(artifact::KEYWORD_HIT));
        assert_eq!(artifact_type_id_by_name("nope"), None);
        assert_eq!(artifact_display_name(artifact::TAG_FILE), Some("Tagged Files"));
    }
}
