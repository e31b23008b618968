//! Module containing functionality related to BSON ObjectIds.
//! For more information, see the documentation for the [`ObjectId`] type.

use std::{
    fmt,
    hash::BuildHasher,
    str::FromStr,
    sync::{
        atomic::{AtomicU32, Ordering},
        OnceLock,
    },
    time::{SystemTime, UNIX_EPOCH},
};

use rand::Rng;

use crate::error::{Error, Result};

const TIMESTAMP_SIZE: usize = 4;
const MACHINE_ID_SIZE: usize = 3;
const PROCESS_ID_SIZE: usize = 2;

const TIMESTAMP_OFFSET: usize = 0;
const MACHINE_ID_OFFSET: usize = TIMESTAMP_OFFSET + TIMESTAMP_SIZE;
const PROCESS_ID_OFFSET: usize = MACHINE_ID_OFFSET + MACHINE_ID_SIZE;
const COUNTER_OFFSET: usize = PROCESS_ID_OFFSET + PROCESS_ID_SIZE;

const MAX_U24: u32 = 0xFF_FFFF;

static OID_COUNTER: OnceLock<AtomicU32> = OnceLock::new();
static MACHINE_BYTES: OnceLock<[u8; MACHINE_ID_SIZE]> = OnceLock::new();

/// A wrapper around a raw 12-byte ObjectId.
///
/// The layout is a 4-byte big-endian timestamp in seconds since the epoch,
/// a 3-byte machine discriminator, a 2-byte process discriminator, and a
/// 3-byte big-endian counter. Ordering and equality are byte-lexicographic
/// over the raw bytes.
#[derive(Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct ObjectId {
    id: [u8; 12],
}

impl ObjectId {
    /// Generates a new [`ObjectId`] from the process-wide generator state.
    pub fn new() -> Self {
        let timestamp = Self::gen_timestamp();
        let machine_id = machine_id();
        let process_id = Self::gen_process_id();
        let counter = Self::gen_count();

        let mut buf = [0u8; 12];
        buf[TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + TIMESTAMP_SIZE].copy_from_slice(&timestamp);
        buf[MACHINE_ID_OFFSET..MACHINE_ID_OFFSET + MACHINE_ID_SIZE].copy_from_slice(&machine_id);
        buf[PROCESS_ID_OFFSET..PROCESS_ID_OFFSET + PROCESS_ID_SIZE].copy_from_slice(&process_id);
        buf[COUNTER_OFFSET..].copy_from_slice(&counter);

        Self::from_bytes(buf)
    }

    /// Constructs a new [`ObjectId`] wrapper around the raw byte representation.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self { id: bytes }
    }

    /// Creates an [`ObjectId`] from a 24-character hexadecimal string.
    pub fn parse_str(s: impl AsRef<str>) -> Result<Self> {
        let s = s.as_ref();

        if s.len() != 24 {
            return Err(Error::oid_invalid_length(s.len()));
        }

        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| Error::from_hex_error(e, s.len()))?;
        Ok(Self::from_bytes(bytes))
    }

    /// Creates a dummy [`ObjectId`] whose timestamp portion is the given
    /// number of seconds since the epoch and whose remaining bytes are zero.
    /// Useful for range queries against a field of generated ids.
    pub fn from_time(seconds_since_epoch: u32) -> Self {
        let mut buf = [0u8; 12];
        buf[TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + TIMESTAMP_SIZE]
            .copy_from_slice(&seconds_since_epoch.to_be_bytes());
        Self::from_bytes(buf)
    }

    /// Returns the raw byte representation.
    pub const fn bytes(&self) -> [u8; 12] {
        self.id
    }

    /// Retrieves the timestamp from the [`ObjectId`] as seconds since the
    /// epoch.
    pub fn timestamp(&self) -> u32 {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&self.id[TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + TIMESTAMP_SIZE]);
        u32::from_be_bytes(buf)
    }

    /// The timestamp portion as milliseconds since the epoch, for comparison
    /// against [`DateTime`](crate::DateTime) values. ObjectIds only record
    /// whole seconds.
    pub fn timestamp_millis(&self) -> i64 {
        i64::from(self.timestamp()) * 1000
    }

    /// Returns the lowercase hexadecimal string representation.
    pub fn to_hex(self) -> String {
        hex::encode(self.id)
    }

    // The current time in seconds, big-endian.
    fn gen_timestamp() -> [u8; 4] {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        seconds.to_be_bytes()
    }

    fn gen_process_id() -> [u8; 2] {
        (std::process::id() as u16).to_le_bytes()
    }

    // The next value of the wrapping 24-bit counter, big-endian. The atomic
    // increment is the only synchronized step; byte assembly happens outside
    // of it.
    fn gen_count() -> [u8; 3] {
        let counter =
            OID_COUNTER.get_or_init(|| AtomicU32::new(rand::rng().random_range(0..=MAX_U24)));
        let count = counter.fetch_add(1, Ordering::SeqCst) & MAX_U24;

        let raw = count.to_be_bytes();
        [raw[1], raw[2], raw[3]]
    }
}

// The machine discriminator is derived once per process from the host name
// and stays stable for the process lifetime. Only the low three bytes of the
// four-byte hash are used. Hosts without a name in the environment fall back
// to random bytes.
fn machine_id() -> [u8; MACHINE_ID_SIZE] {
    *MACHINE_BYTES.get_or_init(|| {
        let hash = match hostname() {
            Some(name) => {
                let hasher = ahash::RandomState::with_seeds(0x62_73_6f_6e, 0x6b_69_74, 0, 0);
                hasher.hash_one(name) as u32
            }
            None => rand::rng().random(),
        };
        let raw = hash.to_le_bytes();
        [raw[0], raw[1], raw[2]]
    })
}

fn hostname() -> Option<String> {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .ok()
        .filter(|name| !name.is_empty())
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectId").field(&self.to_hex()).finish()
    }
}

impl From<[u8; 12]> for ObjectId {
    fn from(bytes: [u8; 12]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_str(s)
    }
}
