use super::{ALPHA_URN, ALPHA_URN_HEVC, AvifContainer, CodedImage, XMP_CONTENT_TYPE};
use crate::codec::Av1Config;
use crate::error::{Error, Result};
use crate::image::{Cicp, ColorPrimaries, MatrixCoefficients, TransferCharacteristics};
use crate::transform::{CleanAperture, Transforms};
use log::{debug, trace, warn};

/// Byte reader over one box payload
#[derive(Debug)]
struct IStream<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> IStream<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn bytes_left(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    fn has_bytes_left(&self) -> bool {
        self.bytes_left() > 0
    }

    fn get_slice(&mut self, size: usize) -> Result<&'a [u8]> {
        if self.bytes_left() < size {
            return Err(Error::Parse("truncated box"));
        }
        let start = self.offset;
        self.offset += size;
        Ok(&self.data[start..self.offset])
    }

    fn sub_stream(&mut self, size: usize) -> Result<IStream<'a>> {
        Ok(IStream::new(self.get_slice(size)?))
    }

    fn rest(&mut self) -> &'a [u8] {
        let start = self.offset.min(self.data.len());
        self.offset = self.data.len();
        &self.data[start..]
    }

    fn skip(&mut self, size: usize) -> Result<()> {
        self.get_slice(size).map(|_| ())
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.get_slice(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16> {
        let b = self.get_slice(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let b = self.get_slice(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_u64(&mut self) -> Result<u64> {
        Ok((u64::from(self.read_u32()?) << 32) | u64::from(self.read_u32()?))
    }

    /// Big-endian unsigned integer of `size` bytes (0 to 8)
    fn read_uxx(&mut self, size: u8) -> Result<u64> {
        if size > 8 {
            return Err(Error::Parse("integer field wider than 64 bits"));
        }
        Ok(self
            .get_slice(usize::from(size))?
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    fn read_fourcc(&mut self) -> Result<[u8; 4]> {
        let b = self.get_slice(4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    fn read_version_and_flags(&mut self) -> Result<(u8, u32)> {
        let version = self.read_u8()?;
        let flags = self.read_uxx(3)? as u32;
        Ok((version, flags))
    }

    /// NUL-terminated string; a missing terminator ends at the box end
    fn read_c_string(&mut self) -> Result<String> {
        let rest = &self.data[self.offset.min(self.data.len())..];
        let (bytes, consumed) = match rest.iter().position(|&b| b == 0) {
            Some(nul) => (&rest[..nul], nul + 1),
            None => (rest, rest.len()),
        };
        self.offset += consumed;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

#[derive(Debug)]
struct BoxHeader {
    box_type: [u8; 4],
    /// Payload size
    size: usize,
}

fn parse_header(stream: &mut IStream<'_>) -> Result<BoxHeader> {
    let start = stream.offset;
    let size32 = stream.read_u32()?;
    let box_type = stream.read_fourcc()?;
    let size = match size32 {
        0 => (stream.bytes_left() + (stream.offset - start)) as u64,
        1 => stream.read_u64()?,
        s => u64::from(s),
    };
    if &box_type == b"uuid" {
        stream.skip(16)?;
    }
    let header_len = (stream.offset - start) as u64;
    let payload = size
        .checked_sub(header_len)
        .ok_or(Error::Parse("box size smaller than its header"))?;
    let size = usize::try_from(payload).map_err(|_| Error::Parse("box too large"))?;
    if size > stream.bytes_left() {
        return Err(Error::Parse("truncated box"));
    }
    Ok(BoxHeader { box_type, size })
}

#[derive(Debug, Default)]
struct FileType {
    major_brand: [u8; 4],
    compatible_brands: Vec<[u8; 4]>,
}

impl FileType {
    fn has_brand(&self, brand: &[u8; 4]) -> bool {
        &self.major_brand == brand || self.compatible_brands.contains(brand)
    }
}

fn parse_ftyp(stream: &mut IStream<'_>) -> Result<FileType> {
    let major_brand = stream.read_fourcc()?;
    // minor_version
    stream.skip(4)?;
    let mut compatible_brands = Vec::new();
    while stream.bytes_left() >= 4 {
        compatible_brands.push(stream.read_fourcc()?);
    }
    Ok(FileType {
        major_brand,
        compatible_brands,
    })
}

#[derive(Debug, Default)]
struct Extent {
    offset: u64,
    length: u64,
}

#[derive(Debug, Default)]
struct ItemLocation {
    item_id: u32,
    construction_method: u8,
    base_offset: u64,
    extents: Vec<Extent>,
}

#[derive(Debug, Default, Clone)]
struct ItemInfo {
    item_id: u32,
    item_type: [u8; 4],
    content_type: String,
}

#[derive(Debug, Clone)]
struct ItemReference {
    reference_type: [u8; 4],
    from_item_id: u32,
    to_item_id: u32,
}

#[derive(Debug, Clone)]
enum Property {
    Spatial { width: u32, height: u32 },
    Av1Config(Av1Config),
    Nclx(Cicp),
    Icc(Vec<u8>),
    AuxType(String),
    Clap(CleanAperture),
    Irot(u8),
    Imir(u8),
    Other,
}

#[derive(Debug, Default)]
struct Meta {
    primary_item_id: u32,
    locations: Vec<ItemLocation>,
    items: Vec<ItemInfo>,
    references: Vec<ItemReference>,
    properties: Vec<Property>,
    /// (item id, 1-based property indices)
    associations: Vec<(u32, Vec<u16>)>,
    idat: Vec<u8>,
}

fn parse_hdlr(stream: &mut IStream<'_>) -> Result<()> {
    stream.read_version_and_flags()?;
    // pre_defined
    stream.skip(4)?;
    if &stream.read_fourcc()? != b"pict" {
        return Err(Error::Parse("meta handler is not pict"));
    }
    Ok(())
}

fn parse_pitm(stream: &mut IStream<'_>) -> Result<u32> {
    let (version, _) = stream.read_version_and_flags()?;
    if version == 0 {
        Ok(u32::from(stream.read_u16()?))
    } else {
        stream.read_u32()
    }
}

fn parse_iloc(stream: &mut IStream<'_>) -> Result<Vec<ItemLocation>> {
    let (version, _) = stream.read_version_and_flags()?;
    if version > 2 {
        return Err(Error::Parse("unsupported iloc version"));
    }
    let sizes = stream.read_u16()?;
    let offset_size = (sizes >> 12) as u8;
    let length_size = ((sizes >> 8) & 0xF) as u8;
    let base_offset_size = ((sizes >> 4) & 0xF) as u8;
    let index_size = if version > 0 { (sizes & 0xF) as u8 } else { 0 };
    let item_count = if version < 2 {
        u32::from(stream.read_u16()?)
    } else {
        stream.read_u32()?
    };

    let mut locations = Vec::new();
    for _ in 0..item_count {
        let item_id = if version < 2 {
            u32::from(stream.read_u16()?)
        } else {
            stream.read_u32()?
        };
        let construction_method = if version > 0 {
            (stream.read_u16()? & 0xF) as u8
        } else {
            0
        };
        if construction_method > 1 {
            return Err(Error::Unsupported("item construction method"));
        }
        // data_reference_index
        stream.skip(2)?;
        let base_offset = stream.read_uxx(base_offset_size)?;
        let extent_count = stream.read_u16()?;
        let mut extents = Vec::new();
        for _ in 0..extent_count {
            stream.read_uxx(index_size)?;
            extents.push(Extent {
                offset: stream.read_uxx(offset_size)?,
                length: stream.read_uxx(length_size)?,
            });
        }
        locations.push(ItemLocation {
            item_id,
            construction_method,
            base_offset,
            extents,
        });
    }
    Ok(locations)
}

fn parse_infe(stream: &mut IStream<'_>) -> Result<ItemInfo> {
    let (version, _) = stream.read_version_and_flags()?;
    if version != 2 && version != 3 {
        return Err(Error::Parse("infe version 2 or 3 expected"));
    }
    let item_id = if version == 2 {
        u32::from(stream.read_u16()?)
    } else {
        stream.read_u32()?
    };
    // item_protection_index
    stream.skip(2)?;
    let item_type = stream.read_fourcc()?;
    // item_name
    stream.read_c_string()?;
    let content_type = if &item_type == b"mime" {
        stream.read_c_string()?
    } else {
        String::new()
    };
    Ok(ItemInfo {
        item_id,
        item_type,
        content_type,
    })
}

fn parse_iinf(stream: &mut IStream<'_>) -> Result<Vec<ItemInfo>> {
    let (version, _) = stream.read_version_and_flags()?;
    let entry_count = if version == 0 {
        u32::from(stream.read_u16()?)
    } else {
        stream.read_u32()?
    };
    let mut items = Vec::new();
    for _ in 0..entry_count {
        let header = parse_header(stream)?;
        if &header.box_type != b"infe" {
            return Err(Error::Parse("non-infe box in iinf"));
        }
        items.push(parse_infe(&mut stream.sub_stream(header.size)?)?);
    }
    Ok(items)
}

fn parse_iref(stream: &mut IStream<'_>) -> Result<Vec<ItemReference>> {
    let (version, _) = stream.read_version_and_flags()?;
    let mut refs = Vec::new();
    if version > 1 {
        return Ok(refs);
    }
    let read_id = |s: &mut IStream<'_>| -> Result<u32> {
        if version == 0 {
            Ok(u32::from(s.read_u16()?))
        } else {
            s.read_u32()
        }
    };
    while stream.has_bytes_left() {
        let header = parse_header(stream)?;
        let mut sub = stream.sub_stream(header.size)?;
        let from_item_id = read_id(&mut sub)?;
        let count = sub.read_u16()?;
        for _ in 0..count {
            refs.push(ItemReference {
                reference_type: header.box_type,
                from_item_id,
                to_item_id: read_id(&mut sub)?,
            });
        }
    }
    Ok(refs)
}

fn parse_property(box_type: &[u8; 4], stream: &mut IStream<'_>) -> Result<Property> {
    Ok(match box_type {
        b"ispe" => {
            stream.read_version_and_flags()?;
            Property::Spatial {
                width: stream.read_u32()?,
                height: stream.read_u32()?,
            }
        }
        // Configuration OBUs after the fixed bytes are not needed
        b"av1C" => Property::Av1Config(Av1Config::from_bytes(stream.get_slice(4)?)?),
        b"colr" => match &stream.read_fourcc()? {
            b"nclx" => {
                let color_primaries = stream.read_u16()?;
                let transfer = stream.read_u16()?;
                let matrix = stream.read_u16()?;
                let full_range = stream.read_u8()? & 0x80 != 0;
                let narrow = |v: u16| u8::try_from(v).unwrap_or(u8::MAX);
                Property::Nclx(Cicp {
                    color_primaries: ColorPrimaries(narrow(color_primaries)),
                    transfer_characteristics: TransferCharacteristics(narrow(transfer)),
                    matrix_coefficients: MatrixCoefficients(narrow(matrix)),
                    full_range,
                })
            }
            b"prof" | b"rICC" => Property::Icc(stream.rest().to_vec()),
            _ => Property::Other,
        },
        b"auxC" => {
            stream.read_version_and_flags()?;
            Property::AuxType(stream.read_c_string()?)
        }
        b"clap" => Property::Clap(CleanAperture {
            width_n: stream.read_u32()?,
            width_d: stream.read_u32()?,
            height_n: stream.read_u32()?,
            height_d: stream.read_u32()?,
            horiz_off_n: stream.read_u32()?,
            horiz_off_d: stream.read_u32()?,
            vert_off_n: stream.read_u32()?,
            vert_off_d: stream.read_u32()?,
        }),
        b"irot" => Property::Irot(stream.read_u8()? & 0x3),
        b"imir" => Property::Imir(stream.read_u8()? & 0x1),
        _ => Property::Other,
    })
}

fn parse_iprp(stream: &mut IStream<'_>, meta: &mut Meta) -> Result<()> {
    let header = parse_header(stream)?;
    if &header.box_type != b"ipco" {
        return Err(Error::Parse("first box in iprp is not ipco"));
    }
    let mut ipco = stream.sub_stream(header.size)?;
    while ipco.has_bytes_left() {
        let header = parse_header(&mut ipco)?;
        let mut sub = ipco.sub_stream(header.size)?;
        meta.properties.push(parse_property(&header.box_type, &mut sub)?);
    }

    while stream.has_bytes_left() {
        let header = parse_header(stream)?;
        let mut ipma = stream.sub_stream(header.size)?;
        if &header.box_type != b"ipma" {
            continue;
        }
        let (version, flags) = ipma.read_version_and_flags()?;
        let entry_count = ipma.read_u32()?;
        for _ in 0..entry_count {
            let item_id = if version < 1 {
                u32::from(ipma.read_u16()?)
            } else {
                ipma.read_u32()?
            };
            let count = ipma.read_u8()?;
            let mut indices = Vec::with_capacity(usize::from(count));
            for _ in 0..count {
                let index = if flags & 1 == 1 {
                    ipma.read_u16()? & 0x7FFF
                } else {
                    u16::from(ipma.read_u8()? & 0x7F)
                };
                indices.push(index);
            }
            meta.associations.push((item_id, indices));
        }
    }
    Ok(())
}

fn parse_meta(stream: &mut IStream<'_>) -> Result<Meta> {
    stream.read_version_and_flags()?;
    let mut meta = Meta::default();
    let mut saw_hdlr = false;
    while stream.has_bytes_left() {
        let header = parse_header(stream)?;
        let mut sub = stream.sub_stream(header.size)?;
        match &header.box_type {
            b"hdlr" => {
                parse_hdlr(&mut sub)?;
                saw_hdlr = true;
            }
            b"pitm" => meta.primary_item_id = parse_pitm(&mut sub)?,
            b"iloc" => meta.locations = parse_iloc(&mut sub)?,
            b"iinf" => meta.items = parse_iinf(&mut sub)?,
            b"iref" => meta.references = parse_iref(&mut sub)?,
            b"iprp" => parse_iprp(&mut sub, &mut meta)?,
            b"idat" => meta.idat = sub.rest().to_vec(),
            other => trace!("skipping meta child {}", String::from_utf8_lossy(other)),
        }
    }
    if !saw_hdlr {
        return Err(Error::Parse("meta box has no hdlr"));
    }
    Ok(meta)
}

impl Meta {
    fn item(&self, id: u32) -> Option<&ItemInfo> {
        self.items.iter().find(|i| i.item_id == id)
    }

    fn properties_of(&self, id: u32) -> impl Iterator<Item = &Property> {
        self.associations
            .iter()
            .filter(move |(item, _)| *item == id)
            .flat_map(|(_, indices)| indices.iter())
            // index 0 means "no property"
            .filter_map(|&index| self.properties.get(usize::from(index).checked_sub(1)?))
    }

    fn item_data(&self, file: &[u8], id: u32) -> Result<Vec<u8>> {
        let location = self
            .locations
            .iter()
            .find(|l| l.item_id == id)
            .ok_or(Error::Parse("item has no location"))?;
        let source = match location.construction_method {
            0 => file,
            _ => &self.idat,
        };
        let mut out = Vec::new();
        for extent in &location.extents {
            let start = location
                .base_offset
                .checked_add(extent.offset)
                .ok_or(Error::Parse("item offset overflow"))?;
            // A zero length extent runs to the end of the source
            let end = if extent.length == 0 {
                source.len() as u64
            } else {
                start
                    .checked_add(extent.length)
                    .ok_or(Error::Parse("item length overflow"))?
            };
            let range = usize::try_from(start).ok().zip(usize::try_from(end).ok());
            let bytes = range
                .and_then(|(s, e)| source.get(s..e))
                .ok_or(Error::Parse("item data out of bounds"))?;
            out.try_reserve(bytes.len())?;
            out.extend_from_slice(bytes);
        }
        Ok(out)
    }

    /// Pair an item's payload with its `av1C` and `ispe`
    fn coded_image(&self, id: u32, data: Vec<u8>) -> Result<CodedImage> {
        let mut av1c = None;
        let mut extent = None;
        for property in self.properties_of(id) {
            match property {
                Property::Av1Config(config) => av1c = Some(*config),
                Property::Spatial { width, height } => extent = Some((*width, *height)),
                _ => {}
            }
        }
        let config = av1c.ok_or(Error::Parse("AV1 item without av1C"))?;
        let (width, height) = extent.ok_or(Error::Parse("image item without ispe"))?;
        Ok(CodedImage {
            data,
            config,
            width,
            height,
        })
    }

    fn alpha_item(&self, primary: u32) -> Option<u32> {
        self.references
            .iter()
            .filter(|r| &r.reference_type == b"auxl" && r.to_item_id == primary)
            .map(|r| r.from_item_id)
            .find(|&id| {
                self.item(id).is_some_and(|i| &i.item_type == b"av01")
                    && self.properties_of(id).any(|p| {
                        matches!(p, Property::AuxType(urn) if urn == ALPHA_URN || urn == ALPHA_URN_HEVC)
                    })
            })
    }

    /// First metadata item of `item_type` describing the primary item,
    /// or any such item when none is linked
    fn metadata_item(&self, primary: u32, wanted: impl Fn(&ItemInfo) -> bool) -> Option<u32> {
        let candidates: Vec<u32> = self.items.iter().filter(|i| wanted(i)).map(|i| i.item_id).collect();
        candidates
            .iter()
            .copied()
            .find(|&id| {
                self.references
                    .iter()
                    .any(|r| &r.reference_type == b"cdsc" && r.from_item_id == id && r.to_item_id == primary)
            })
            .or_else(|| candidates.first().copied())
    }
}

/// Walk the top-level boxes and return the parsed `meta`
fn read_meta(data: &[u8]) -> Result<Meta> {
    if data.is_empty() {
        return Err(Error::Parse("empty input"));
    }
    let mut stream = IStream::new(data);
    let mut ftyp: Option<FileType> = None;
    let mut meta: Option<Meta> = None;
    let mut has_moov = false;

    while stream.has_bytes_left() {
        let header = parse_header(&mut stream)?;
        let mut sub = stream.sub_stream(header.size)?;
        match &header.box_type {
            b"ftyp" => {
                let file_type = parse_ftyp(&mut sub)?;
                if !file_type.has_brand(b"avif") && !file_type.has_brand(b"avis") {
                    return Err(Error::Parse("not an AVIF file"));
                }
                ftyp = Some(file_type);
            }
            _ if ftyp.is_none() => return Err(Error::Parse("not an AVIF file")),
            b"meta" => meta = Some(parse_meta(&mut sub)?),
            b"moov" => has_moov = true,
            _ => {}
        }
    }

    let ftyp = ftyp.ok_or(Error::Parse("not an AVIF file"))?;
    match meta {
        Some(meta) => Ok(meta),
        None if has_moov || ftyp.has_brand(b"avis") => {
            Err(Error::Unsupported("image sequences without a primary still item"))
        }
        None => Err(Error::Parse("missing meta box")),
    }
}

/// Parse an AVIF file.
///
/// The color and alpha payloads and the premultiplied flag come from
/// `avif-parse`; item properties, transforms and metadata items are read
/// by the box walker here.
pub fn parse(data: &[u8]) -> Result<AvifContainer> {
    let meta = read_meta(data)?;

    let primary = meta.primary_item_id;
    let item = meta.item(primary).ok_or(Error::Parse("primary item not found"))?;
    match &item.item_type {
        b"av01" => {}
        b"grid" => return Err(Error::Unsupported("grid images")),
        _ => return Err(Error::Unsupported("primary item is not AV1")),
    }

    let options = avif_parse::ParseOptions { lenient: true };
    let items = avif_parse::read_avif_with_options(&mut &data[..], &options)?;

    let color = meta.coded_image(primary, items.primary_item.to_vec())?;
    let mut cicp = None;
    let mut icc = None;
    let mut transforms = Transforms::default();
    for property in meta.properties_of(primary) {
        match property {
            Property::Nclx(c) if cicp.is_none() => cicp = Some(*c),
            Property::Icc(bytes) if icc.is_none() => icc = Some(bytes.clone()),
            Property::Clap(c) => transforms.clap = Some(*c),
            Property::Irot(a) => transforms.irot = Some(*a),
            Property::Imir(a) => transforms.imir = Some(*a),
            _ => {}
        }
    }

    let alpha = match (meta.alpha_item(primary), items.alpha_item.as_deref()) {
        (Some(id), Some(bytes)) => Some(meta.coded_image(id, bytes.to_vec())?),
        (None, None) => None,
        _ => {
            warn!("alpha item is not linked consistently, ignoring it");
            None
        }
    };
    let premultiplied = alpha.is_some() && items.premultiplied_alpha;

    let exif_item = match meta.metadata_item(primary, |i| &i.item_type == b"Exif") {
        Some(id) => match meta.item_data(data, id) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                warn!("ignoring unreadable Exif item: {err}");
                None
            }
        },
        None => None,
    };
    let xmp = match meta.metadata_item(primary, |i| {
        &i.item_type == b"mime" && i.content_type == XMP_CONTENT_TYPE
    }) {
        Some(id) => match meta.item_data(data, id) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                warn!("ignoring unreadable XMP item: {err}");
                None
            }
        },
        None => None,
    };

    debug!(
        "parsed AVIF: {}x{} color {} bytes, alpha {:?} bytes{}, nclx {}, icc {}",
        color.width,
        color.height,
        color.data.len(),
        alpha.as_ref().map(|a| a.data.len()),
        if premultiplied { " (premultiplied)" } else { "" },
        cicp.is_some(),
        icc.is_some()
    );

    Ok(AvifContainer {
        color,
        alpha,
        cicp,
        icc,
        transforms,
        exif_item,
        xmp,
        premultiplied,
    })
}
