//! Builders for small MDF 3.x and 4.x files used by the integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// 4.x `cn_data_type` codes.
pub mod dt {
    pub const UINT_LE: u8 = 0;
    pub const UINT_BE: u8 = 1;
    pub const INT_LE: u8 = 2;
    pub const FLOAT_LE: u8 = 4;
    pub const STRING_LATIN1: u8 = 6;
    pub const STRING_UTF8: u8 = 7;
    pub const BYTE_ARRAY: u8 = 10;
}

/// 4.x `cn_type` codes.
pub mod ct {
    pub const FIXED: u8 = 0;
    pub const VLSD: u8 = 1;
    pub const MASTER: u8 = 2;
    pub const VIRTUAL_MASTER: u8 = 3;
}

#[derive(Debug, Clone)]
pub enum Conversion {
    None,
    Linear { offset: f64, factor: f64 },
    TextTable {
        entries: Vec<(f64, &'static str)>,
        default: Option<&'static str>,
    },
    TextRange {
        ranges: Vec<(f64, f64, &'static str)>,
        default: Option<&'static str>,
    },
}

#[derive(Debug, Clone)]
pub struct Channel {
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub channel_type: u8,
    pub data_type: u8,
    pub byte_offset: u32,
    pub bit_offset: u8,
    pub bit_count: u32,
    pub conversion: Conversion,
    /// Bit position within the invalidation bytes.
    pub invalidation_bit: Option<u32>,
    /// `cn_data` link, for VLSD channels.
    pub data: u64,
}

impl Channel {
    pub fn new(name: &'static str, data_type: u8, byte_offset: u32, bit_count: u32) -> Self {
        Self {
            name,
            unit: None,
            channel_type: ct::FIXED,
            data_type,
            byte_offset,
            bit_offset: 0,
            bit_count,
            conversion: Conversion::None,
            invalidation_bit: None,
            data: 0,
        }
    }

    pub fn master(mut self) -> Self {
        self.channel_type = ct::MASTER;
        self
    }

    pub fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn bits(mut self, bit_offset: u8) -> Self {
        self.bit_offset = bit_offset;
        self
    }

    pub fn conversion(mut self, conversion: Conversion) -> Self {
        self.conversion = conversion;
        self
    }

    pub fn invalidation(mut self, bit: u32) -> Self {
        self.invalidation_bit = Some(bit);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Group {
    pub name: Option<&'static str>,
    pub record_id: u64,
    pub cycles: u64,
    pub data_bytes: u32,
    pub invalidation_bytes: u32,
    pub vlsd: bool,
    pub channels: Vec<Channel>,
}

impl Group {
    pub fn new(name: &'static str, cycles: u64, data_bytes: u32, channels: Vec<Channel>) -> Self {
        Self {
            name: Some(name),
            record_id: 0,
            cycles,
            data_bytes,
            invalidation_bytes: 0,
            vlsd: false,
            channels,
        }
    }
}

/// Lays out 4.x blocks one after the other, 8-byte aligned.
pub struct Mdf4 {
    buf: Vec<u8>,
}

pub const HD: u64 = 64;

impl Default for Mdf4 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mdf4 {
    pub fn new() -> Self {
        let mut buf = vec![0u8; 64];
        buf[0..8].copy_from_slice(b"MDF     ");
        buf[8..16].copy_from_slice(b"4.10    ");
        buf[16..24].copy_from_slice(b"fixture ");
        buf[28..30].copy_from_slice(&410u16.to_le_bytes());
        let mut file = Self { buf };
        let hd = file.block(b"##HD", &[0; 6], &[0; 32]);
        assert_eq!(hd, HD);
        file
    }

    pub fn block(&mut self, id: &[u8; 4], links: &[u64], payload: &[u8]) -> u64 {
        while self.buf.len() % 8 != 0 {
            self.buf.push(0);
        }
        let at = self.buf.len() as u64;
        let length = 24 + links.len() * 8 + payload.len();
        self.buf.extend_from_slice(id);
        self.buf.extend_from_slice(&0u32.to_le_bytes());
        self.buf.extend_from_slice(&(length as u64).to_le_bytes());
        self.buf.extend_from_slice(&(links.len() as u64).to_le_bytes());
        for link in links {
            self.buf.extend_from_slice(&link.to_le_bytes());
        }
        self.buf.extend_from_slice(payload);
        at
    }

    /// Overwrite link `index` of the block at `block`.
    pub fn link(&mut self, block: u64, index: usize, target: u64) {
        let at = block as usize + 24 + index * 8;
        self.buf[at..at + 8].copy_from_slice(&target.to_le_bytes());
    }

    pub fn text(&mut self, text: &str) -> u64 {
        let mut payload = text.as_bytes().to_vec();
        payload.push(0);
        self.block(b"##TX", &[], &payload)
    }

    pub fn metadata(&mut self, xml: &str) -> u64 {
        let mut payload = xml.as_bytes().to_vec();
        payload.push(0);
        self.block(b"##MD", &[], &payload)
    }

    pub fn start_time(&mut self, ns: u64) {
        let at = HD as usize + 24 + 6 * 8;
        self.buf[at..at + 8].copy_from_slice(&ns.to_le_bytes());
    }

    pub fn header_comment(&mut self, xml: &str) {
        let md = self.metadata(xml);
        self.link(HD, 5, md);
    }

    fn conversion(&mut self, conversion: &Conversion) -> u64 {
        let cc = |kind: u8, refs: &[u64], values: &[f64]| {
            let mut payload = vec![kind, 0, 0, 0];
            payload.extend_from_slice(&(refs.len() as u16).to_le_bytes());
            payload.extend_from_slice(&(values.len() as u16).to_le_bytes());
            for v in values {
                payload.extend_from_slice(&v.to_le_bytes());
            }
            let mut links = vec![0u64; 4];
            links.extend_from_slice(refs);
            (links, payload)
        };
        let (links, payload) = match conversion {
            Conversion::None => return 0,
            Conversion::Linear { offset, factor } => cc(1, &[], &[*offset, *factor]),
            Conversion::TextTable { entries, default } => {
                let mut refs: Vec<u64> = entries.iter().map(|(_, t)| self.text(t)).collect();
                refs.push(default.map_or(0, |d| self.text(d)));
                let keys: Vec<f64> = entries.iter().map(|(k, _)| *k).collect();
                cc(7, &refs, &keys)
            }
            Conversion::TextRange { ranges, default } => {
                let mut refs: Vec<u64> = ranges.iter().map(|(_, _, t)| self.text(t)).collect();
                refs.push(default.map_or(0, |d| self.text(d)));
                let bounds: Vec<f64> = ranges.iter().flat_map(|(lo, hi, _)| [*lo, *hi]).collect();
                cc(8, &refs, &bounds)
            }
        };
        self.block(b"##CC", &links, &payload)
    }

    fn channel(&mut self, channel: &Channel, next: u64) -> u64 {
        let name = self.text(channel.name);
        let unit = channel.unit.map_or(0, |u| self.text(u));
        let conversion = self.conversion(&channel.conversion);
        let mut payload = vec![0u8; 72];
        payload[0] = channel.channel_type;
        payload[2] = channel.data_type;
        payload[3] = channel.bit_offset;
        payload[4..8].copy_from_slice(&channel.byte_offset.to_le_bytes());
        payload[8..12].copy_from_slice(&channel.bit_count.to_le_bytes());
        if let Some(bit) = channel.invalidation_bit {
            payload[12..16].copy_from_slice(&2u32.to_le_bytes());
            payload[16..20].copy_from_slice(&bit.to_le_bytes());
        }
        self.block(
            b"##CN",
            &[next, 0, name, 0, conversion, channel.data, unit, 0],
            &payload,
        )
    }

    /// Write a channel group with its channel chain; returns the CG address.
    pub fn channel_group(&mut self, group: &Group) -> u64 {
        let mut next = 0;
        for channel in group.channels.iter().rev() {
            next = self.channel(channel, next);
        }
        let name = group.name.map_or(0, |n| self.text(n));
        let mut payload = vec![0u8; 32];
        payload[0..8].copy_from_slice(&group.record_id.to_le_bytes());
        payload[8..16].copy_from_slice(&group.cycles.to_le_bytes());
        payload[16..18].copy_from_slice(&u16::from(group.vlsd).to_le_bytes());
        payload[24..28].copy_from_slice(&group.data_bytes.to_le_bytes());
        payload[28..32].copy_from_slice(&group.invalidation_bytes.to_le_bytes());
        self.block(b"##CG", &[0, next, name, 0, 0, 0], &payload)
    }

    /// Chain channel groups into a data group and append it to the header's
    /// data group list.
    pub fn data_group(&mut self, record_id_size: u8, groups: &[u64], data: u64) -> u64 {
        for pair in groups.windows(2) {
            self.link(pair[0], 0, pair[1]);
        }
        let mut payload = vec![0u8; 8];
        payload[0] = record_id_size;
        let dg = self.block(
            b"##DG",
            &[0, groups.first().copied().unwrap_or(0), data, 0],
            &payload,
        );
        let mut last = HD;
        let mut index = 0;
        loop {
            let at = last as usize + 24 + index * 8;
            let link = u64::from_le_bytes(self.buf[at..at + 8].try_into().unwrap());
            if link == 0 {
                self.link(last, index, dg);
                break;
            }
            last = link;
            index = 0;
        }
        dg
    }

    pub fn dt(&mut self, data: &[u8]) -> u64 {
        self.block(b"##DT", &[], data)
    }

    pub fn sd(&mut self, data: &[u8]) -> u64 {
        self.block(b"##SD", &[], data)
    }

    pub fn dz(&mut self, data: &[u8]) -> u64 {
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(data, 6);
        let mut payload = vec![b'D', b'T', 0, 0, 0, 0, 0, 0];
        payload.extend_from_slice(&(data.len() as u64).to_le_bytes());
        payload.extend_from_slice(&(compressed.len() as u64).to_le_bytes());
        payload.extend_from_slice(&compressed);
        self.block(b"##DZ", &[], &payload)
    }

    /// Data list over `fragments` whose lengths are given for the offsets table.
    pub fn dl(&mut self, fragments: &[(u64, u64)]) -> u64 {
        let mut links = vec![0u64];
        links.extend(fragments.iter().map(|(at, _)| *at));
        let mut payload = vec![0u8; 8];
        payload[4..8].copy_from_slice(&(fragments.len() as u32).to_le_bytes());
        let mut offset = 0u64;
        for (_, len) in fragments {
            payload.extend_from_slice(&offset.to_le_bytes());
            offset += len;
        }
        self.block(b"##DL", &links, &payload)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, &self.buf).unwrap();
        path
    }
}

/// 3.x file with one data group and one channel group.
pub struct Mdf3 {
    buf: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Channel3 {
    pub name: &'static str,
    pub master: bool,
    /// 3.x signal data type code.
    pub data_type: u16,
    pub start_bit: u16,
    pub bit_count: u16,
    /// Linear (offset, factor).
    pub linear: Option<(f64, f64)>,
    pub unit: &'static str,
}

impl Mdf3 {
    fn push(&mut self, id: &[u8; 2], body: &[u8]) -> u32 {
        let at = self.buf.len() as u32;
        self.buf.extend_from_slice(id);
        self.buf
            .extend_from_slice(&((4 + body.len()) as u16).to_le_bytes());
        self.buf.extend_from_slice(body);
        at
    }

    fn patch_u32(&mut self, at: u32, value: u32) {
        let at = at as usize;
        self.buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    fn fixed(field: &mut [u8], text: &str) {
        field[..text.len()].copy_from_slice(text.as_bytes());
    }

    /// Build a file holding `records`, each `record_size` bytes.
    pub fn build(
        channels: &[Channel3],
        record_size: u16,
        records: &[u8],
        author: &str,
        comment: &str,
    ) -> Vec<u8> {
        let mut file = Self { buf: vec![0u8; 64] };
        file.buf[0..8].copy_from_slice(b"MDF     ");
        file.buf[8..16].copy_from_slice(b"3.30    ");
        file.buf[16..24].copy_from_slice(b"fixture ");
        file.buf[28..30].copy_from_slice(&330u16.to_le_bytes());

        let mut hd = vec![0u8; 160];
        Self::fixed(&mut hd[14..24], "24:12:2019");
        Self::fixed(&mut hd[24..32], "18:30:00");
        Self::fixed(&mut hd[32..64], author);
        let hd_at = file.push(b"HD", &hd);

        let mut tx = comment.as_bytes().to_vec();
        tx.push(0);
        let tx_at = file.push(b"TX", &tx);
        file.patch_u32(hd_at + 8, tx_at);

        let dg_at = file.push(b"DG", &[0u8; 24]);
        file.patch_u32(hd_at + 4, dg_at);

        let mut cg = vec![0u8; 22];
        cg[14..16].copy_from_slice(&(channels.len() as u16).to_le_bytes());
        cg[16..18].copy_from_slice(&record_size.to_le_bytes());
        cg[18..22].copy_from_slice(&((records.len() / record_size as usize) as u32).to_le_bytes());
        let cg_at = file.push(b"CG", &cg);
        file.patch_u32(dg_at + 8, cg_at);

        let mut previous: Option<u32> = None;
        for channel in channels {
            let cc_at = match channel.linear {
                Some((offset, factor)) => {
                    let mut cc = vec![0u8; 58];
                    Self::fixed(&mut cc[18..38], channel.unit);
                    cc[38..40].copy_from_slice(&0u16.to_le_bytes());
                    cc[40..42].copy_from_slice(&2u16.to_le_bytes());
                    cc[42..50].copy_from_slice(&offset.to_le_bytes());
                    cc[50..58].copy_from_slice(&factor.to_le_bytes());
                    file.push(b"CC", &cc)
                }
                None => 0,
            };
            let mut cn = vec![0u8; 224];
            cn[4..8].copy_from_slice(&cc_at.to_le_bytes());
            cn[20..22].copy_from_slice(&u16::from(channel.master).to_le_bytes());
            Self::fixed(&mut cn[22..54], channel.name);
            cn[182..184].copy_from_slice(&channel.start_bit.to_le_bytes());
            cn[184..186].copy_from_slice(&channel.bit_count.to_le_bytes());
            cn[186..188].copy_from_slice(&channel.data_type.to_le_bytes());
            let cn_at = file.push(b"CN", &cn);
            match previous {
                Some(prev) => file.patch_u32(prev + 4, cn_at),
                None => file.patch_u32(cg_at + 8, cn_at),
            }
            previous = Some(cn_at);
        }

        let data_at = file.buf.len() as u32;
        file.buf.extend_from_slice(records);
        file.patch_u32(dg_at + 16, data_at);
        file.buf
    }
}
