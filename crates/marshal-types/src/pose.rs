//! Rigid-body pose: position vector, rotation matrix, and metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default coordinate frame tag for a pose.
pub const DEFAULT_FRAME: &str = "scanner";

/// Source tag for a pose that was never written (or produced by the
/// forward-kinematics pipeline).
pub const SOURCE_FK: &str = "fk";

/// Source tag assigned to poses ingested over the HTTP API when the
/// request body does not name one.
pub const SOURCE_API: &str = "api";

/// The most recent rigid-body transform reported by the tracking
/// pipeline.
///
/// The rotation matrix is row-major and is not validated for
/// orthonormality; the marshal stores and serves whatever the producer
/// reported. Serialized form:
///
/// ```json
/// {"t_ms":1757689141234,"p":[0.0,0.0,0.0],"R":[1,0,0,0,1,0,0,0,1],
///  "frame":"scanner","source":"fk"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Wall-clock instant the pose was produced, millisecond precision.
    #[serde(rename = "t_ms", with = "chrono::serde::ts_milliseconds")]
    pub t: DateTime<Utc>,

    /// Position in meters.
    pub p: [f64; 3],

    /// Row-major 3x3 rotation matrix.
    #[serde(rename = "R")]
    pub r: [f64; 9],

    /// Coordinate frame tag.
    pub frame: String,

    /// Producer tag (`"fk"`, `"api"`, ...).
    pub source: String,
}

impl Default for Pose {
    /// The zero pose: origin position, identity rotation, epoch
    /// timestamp. This is what `GET /v1/pose/current` reports before
    /// any update arrives.
    fn default() -> Self {
        Self {
            t: DateTime::<Utc>::UNIX_EPOCH,
            p: [0.0, 0.0, 0.0],
            r: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            frame: String::from(DEFAULT_FRAME),
            source: String::from(SOURCE_FK),
        }
    }
}
