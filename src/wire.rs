//! A pure, in-memory binary codec for the two message shapes the core
//! exchanges with neighbors: `AvailabilityInfo` summaries and `TaskBag`
//! requests. No socket or file I/O lives here — encode/decode are plain
//! functions over `&[u8]`/`Vec<u8>`; the external collaborator owns the
//! actual transport.
//!
//! Integers are varint-encoded; doubles use a fixed 8-byte big-endian
//! encoding of the IEEE-754 bit pattern, canonicalizing NaN and the two
//! zeros to single representations so cross-archive comparison is exact.

use crate::clustering::{ClusterContext, MDZCluster, Requirements};
use crate::dispatch::TaskBag;
use crate::error::CoreError;
use crate::summary::AvailabilityInfo;
use crate::za::{SubFunction, Z};

const TAG_AVAILABILITY: u8 = 1;
const TAG_TASK_BAG: u8 = 2;

/// A reified sum of the wire message kinds, in place of the source's
/// dynamic dispatch over message classes.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Availability(AvailabilityWire),
    TaskBag(TaskBag),
}

/// The on-wire shape of an `AvailabilityInfo`: enough to reconstruct the
/// cluster list and axis ranges without the `ClusteringConfig` the
/// in-memory type would otherwise need.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityWire {
    pub context: ClusterContext,
    pub clusters: Vec<ClusterWire>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterWire {
    pub value: u32,
    pub min_m: i32,
    pub min_d: i32,
    pub max_z: Vec<SubFunction>,
    pub accum_msq: f64,
    pub accum_mln: f64,
    pub accum_dsq: f64,
    pub accum_dln: f64,
    pub accum_zsq: f64,
    pub accum_max_z: Vec<SubFunction>,
}

pub fn encode(message: &Message) -> Vec<u8> {
    let mut out = Vec::new();
    match message {
        Message::Availability(info) => {
            out.push(TAG_AVAILABILITY);
            encode_availability(info, &mut out);
        }
        Message::TaskBag(bag) => {
            out.push(TAG_TASK_BAG);
            encode_task_bag(bag, &mut out);
        }
    }
    out
}

pub fn decode(buf: &[u8]) -> Result<Message, CoreError> {
    let mut pos = 0usize;
    let tag = read_u8(buf, &mut pos)?;
    match tag {
        TAG_AVAILABILITY => Ok(Message::Availability(decode_availability(buf, &mut pos)?)),
        TAG_TASK_BAG => Ok(Message::TaskBag(decode_task_bag(buf, &mut pos)?)),
        other => Err(CoreError::MalformedMessage(format!("unknown message tag {other}"))),
    }
}

/// Converts a live `AvailabilityInfo` into its wire shape.
pub fn to_wire(info: &AvailabilityInfo) -> AvailabilityWire {
    AvailabilityWire {
        context: info.context(),
        clusters: info.clusters().iter().map(cluster_to_wire).collect(),
    }
}

fn cluster_to_wire(c: &MDZCluster) -> ClusterWire {
    ClusterWire {
        value: c.value,
        min_m: c.min_m,
        min_d: c.min_d,
        max_z: c.max_z.pieces().to_vec(),
        accum_msq: c.accum_msq,
        accum_mln: c.accum_mln,
        accum_dsq: c.accum_dsq,
        accum_dln: c.accum_dln,
        accum_zsq: c.accum_zsq,
        accum_max_z: c.accum_max_z.pieces().to_vec(),
    }
}

/// Reconstructs clusters from their wire shape. The resulting `MDZCluster`
/// list is caller-owned; it does not round-trip into a full
/// `AvailabilityInfo` here since that also needs a `ClusteringConfig`.
pub fn from_wire(wire: &AvailabilityWire) -> Vec<MDZCluster> {
    wire.clusters
        .iter()
        .map(|c| MDZCluster {
            value: c.value,
            min_m: c.min_m,
            min_d: c.min_d,
            max_z: Z::from_pieces(c.max_z.clone()),
            accum_msq: c.accum_msq,
            accum_mln: c.accum_mln,
            accum_dsq: c.accum_dsq,
            accum_dln: c.accum_dln,
            accum_zsq: c.accum_zsq,
            accum_max_z: Z::from_pieces(c.accum_max_z.clone()),
        })
        .collect()
}

fn encode_availability(info: &AvailabilityWire, out: &mut Vec<u8>) {
    encode_i64(info.context.min_m as i64, out);
    encode_i64(info.context.max_m as i64, out);
    encode_i64(info.context.min_d as i64, out);
    encode_i64(info.context.max_d as i64, out);
    encode_f64(info.context.min_slowness, out);
    encode_f64(info.context.max_slowness, out);
    encode_varint(info.clusters.len() as u64, out);
    for cluster in &info.clusters {
        encode_varint(cluster.value as u64, out);
        encode_i64(cluster.min_m as i64, out);
        encode_i64(cluster.min_d as i64, out);
        encode_pieces(&cluster.max_z, out);
        encode_f64(cluster.accum_msq, out);
        encode_f64(cluster.accum_mln, out);
        encode_f64(cluster.accum_dsq, out);
        encode_f64(cluster.accum_dln, out);
        encode_f64(cluster.accum_zsq, out);
        encode_pieces(&cluster.accum_max_z, out);
    }
}

fn decode_availability(buf: &[u8], pos: &mut usize) -> Result<AvailabilityWire, CoreError> {
    let context = ClusterContext {
        min_m: read_i64(buf, pos)? as i32,
        max_m: read_i64(buf, pos)? as i32,
        min_d: read_i64(buf, pos)? as i32,
        max_d: read_i64(buf, pos)? as i32,
        min_slowness: read_f64(buf, pos)?,
        max_slowness: read_f64(buf, pos)?,
    };
    let count = read_varint(buf, pos)?;
    let mut clusters = Vec::with_capacity(count as usize);
    for _ in 0..count {
        clusters.push(ClusterWire {
            value: read_varint(buf, pos)? as u32,
            min_m: read_i64(buf, pos)? as i32,
            min_d: read_i64(buf, pos)? as i32,
            max_z: decode_pieces(buf, pos)?,
            accum_msq: read_f64(buf, pos)?,
            accum_mln: read_f64(buf, pos)?,
            accum_dsq: read_f64(buf, pos)?,
            accum_dln: read_f64(buf, pos)?,
            accum_zsq: read_f64(buf, pos)?,
            accum_max_z: decode_pieces(buf, pos)?,
        });
    }
    Ok(AvailabilityWire { context, clusters })
}

fn encode_pieces(pieces: &[SubFunction], out: &mut Vec<u8>) {
    encode_varint(pieces.len() as u64, out);
    for p in pieces {
        encode_f64(p.l, out);
        encode_f64(p.x, out);
        encode_f64(p.y, out);
        encode_f64(p.z1, out);
        encode_f64(p.z2, out);
    }
}

fn decode_pieces(buf: &[u8], pos: &mut usize) -> Result<Vec<SubFunction>, CoreError> {
    let count = read_varint(buf, pos)?;
    let mut pieces = Vec::with_capacity(count as usize);
    for _ in 0..count {
        pieces.push(SubFunction::new(
            read_f64(buf, pos)?,
            read_f64(buf, pos)?,
            read_f64(buf, pos)?,
            read_f64(buf, pos)?,
            read_f64(buf, pos)?,
        ));
    }
    Ok(pieces)
}

fn encode_task_bag(bag: &TaskBag, out: &mut Vec<u8>) {
    encode_varint(bag.requester as u64, out);
    encode_varint(bag.request_id as u64, out);
    encode_varint(bag.first_task as u64, out);
    encode_varint(bag.last_task as u64, out);
    encode_i64(bag.requirements.max_memory as i64, out);
    encode_i64(bag.requirements.max_disk as i64, out);
}

fn decode_task_bag(buf: &[u8], pos: &mut usize) -> Result<TaskBag, CoreError> {
    Ok(TaskBag {
        requester: read_varint(buf, pos)? as u32,
        request_id: read_varint(buf, pos)? as u32,
        first_task: read_varint(buf, pos)? as u32,
        last_task: read_varint(buf, pos)? as u32,
        requirements: Requirements {
            max_memory: read_i64(buf, pos)? as i32,
            max_disk: read_i64(buf, pos)? as i32,
        },
    })
}

fn encode_varint(mut v: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            out.push(byte);
            break;
        } else {
            out.push(byte | 0x80);
        }
    }
}

fn read_varint(buf: &[u8], pos: &mut usize) -> Result<u64, CoreError> {
    let mut result = 0u64;
    let mut shift = 0u32;
    loop {
        let byte = read_u8(buf, pos)?;
        result |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
        if shift >= 64 {
            return Err(CoreError::MalformedMessage("varint too long".into()));
        }
    }
}

/// Zig-zag encodes the signed integer so small negative values stay
/// compact under varint encoding.
fn encode_i64(v: i64, out: &mut Vec<u8>) {
    let zigzag = ((v << 1) ^ (v >> 63)) as u64;
    encode_varint(zigzag, out);
}

fn read_i64(buf: &[u8], pos: &mut usize) -> Result<i64, CoreError> {
    let zigzag = read_varint(buf, pos)?;
    Ok(((zigzag >> 1) as i64) ^ -((zigzag & 1) as i64))
}

fn encode_f64(v: f64, out: &mut Vec<u8>) {
    let canonical = if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        if v.is_sign_negative() { (-0.0f64).to_bits() } else { 0.0f64.to_bits() }
    } else {
        v.to_bits()
    };
    out.extend_from_slice(&canonical.to_be_bytes());
}

fn read_f64(buf: &[u8], pos: &mut usize) -> Result<f64, CoreError> {
    if *pos + 8 > buf.len() {
        return Err(CoreError::MalformedMessage("truncated double".into()));
    }
    let bytes: [u8; 8] = buf[*pos..*pos + 8].try_into().unwrap();
    *pos += 8;
    Ok(f64::from_be_bytes(bytes))
}

fn read_u8(buf: &[u8], pos: &mut usize) -> Result<u8, CoreError> {
    let byte = buf.get(*pos).copied().ok_or_else(|| CoreError::MalformedMessage("truncated message".into()))?;
    *pos += 1;
    Ok(byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::za::MIN_A;

    #[test]
    fn task_bag_round_trips() {
        let bag = TaskBag {
            requester: 7,
            request_id: 42,
            first_task: 100,
            last_task: 199,
            requirements: Requirements { max_memory: 256, max_disk: 1024 },
        };
        let encoded = encode(&Message::TaskBag(bag));
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, Message::TaskBag(bag));
    }

    #[test]
    fn availability_round_trips() {
        let info = AvailabilityWire {
            context: ClusterContext { min_m: 512, max_m: 4096, min_d: 2048, max_d: 16384, min_slowness: 0.0, max_slowness: 1.0 },
            clusters: vec![ClusterWire {
                value: 3,
                min_m: 512,
                min_d: 2048,
                max_z: vec![SubFunction::new(MIN_A, 1.0, 0.0, 0.001, 0.0)],
                accum_msq: 0.25,
                accum_mln: 0.1,
                accum_dsq: 0.5,
                accum_dln: 0.2,
                accum_zsq: 0.5,
                accum_max_z: vec![SubFunction::new(MIN_A, 1.0, 0.0, 0.001, 0.0)],
            }],
        };
        let encoded = encode(&Message::Availability(info.clone()));
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, Message::Availability(info));
    }

    #[test]
    fn truncated_message_reports_malformed_not_panic() {
        let result = decode(&[TAG_TASK_BAG]);
        assert!(matches!(result, Err(CoreError::MalformedMessage(_))));
    }

    #[test]
    fn unknown_tag_is_malformed() {
        let result = decode(&[99]);
        assert!(matches!(result, Err(CoreError::MalformedMessage(_))));
    }

    /// `Z` is the one domain type that actually crosses a serde boundary in
    /// practice (a fixture saved by an external harness, not this codec).
    #[test]
    fn z_round_trips_through_json() {
        let z = Z::from_pieces(vec![
            SubFunction::new(MIN_A, 1.0, 0.5, 0.001, 0.2),
            SubFunction::new(10.0, 0.0, 0.0, 0.002, 0.0),
        ]);
        let json = serde_json::to_string(&z).unwrap();
        let restored: Z = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, z);
    }
}
