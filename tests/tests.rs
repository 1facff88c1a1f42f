use indoc::indoc;
use rstest::rstest;
use std::{
    fs,
    io::{self, Cursor, Write},
    path::PathBuf,
    sync::Once,
};
use verinfo::{constants::*, types::*, *};
use zerocopy::FromBytes;

static CONFIG_PATH_CMD: &str = "./tests/assets/cmd.json";
static CONFIG_PATH_EXPLORER: &str = "./tests/assets/explorer.json";
static CONFIG_PATH_EMPTY: &str = "./tests/assets/empty.json";
static CONFIG_PATH_BAD: &str = "./tests/assets/bad.json";
static ICON_PATH: &str = "./tests/assets/icon.ico";
static MANIFEST_PATH: &str = "./tests/assets/app.manifest";

static INIT_LOGGER: Once = Once::new();
fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::builder()
            .is_test(false)
            .filter_level(log::LevelFilter::Info)
            .format_timestamp(None)
            .format_module_path(false)
            .format_level(true)
            .format_target(false)
            .write_style(env_logger::WriteStyle::Auto)
            .init();
    });
}

// file header and section header
const SECTION_OFFSET: usize = 60;

fn build(path: &str) -> VersionInfo {
    let document = VersionDocument::from_file(path).unwrap();
    VersionInfo::build(document).unwrap()
}

fn coff_header(object: &[u8]) -> CoffHeader { CoffHeader::read_from_prefix(object).unwrap().0 }

fn section_header(object: &[u8]) -> SectionHeader {
    SectionHeader::read_from_prefix(&object[20..]).unwrap().0
}

fn data_entry(object: &[u8], offset: usize) -> ResourceDataEntry {
    ResourceDataEntry::read_from_prefix(&object[SECTION_OFFSET + offset..]).unwrap().0
}

#[rstest]
#[case(CONFIG_PATH_CMD, "./tests/assets/cmd.hex")]
#[case(CONFIG_PATH_EXPLORER, "./tests/assets/explorer.hex")]
#[case(CONFIG_PATH_EMPTY, "./tests/assets/empty.hex")]
fn build_version_info(#[case] config: &str, #[case] expected: &str) {
    init_logger();

    let info = build(config);
    let expected = fs::read(expected).unwrap();
    assert_eq!(info.buffer(), &expected[..], "version info matches reference");

    let length = { info.structure().header.length };
    assert_eq!(length as usize, info.buffer().len(), "root length covers the whole buffer");
    assert_eq!(info.structure().size() as usize, info.buffer().len());
}

#[test]
fn build_version_info_deterministic() {
    init_logger();

    let first = build(CONFIG_PATH_EXPLORER);
    let second = build(CONFIG_PATH_EXPLORER);
    assert_eq!(first.buffer(), second.buffer());
    assert_eq!(first.object(Architecture::Amd64).unwrap(), second.object(Architecture::Amd64).unwrap());
}

#[test]
fn build_empty_string_table() {
    init_logger();

    let info = build(CONFIG_PATH_EMPTY);
    let string_file_info = &info.structure().string_file_info;
    assert!(string_file_info.table.strings.is_empty(), "no strings in table");
    assert_eq!({ string_file_info.header.length }, 58);
    assert_eq!({ string_file_info.table.header.length }, 22);

    let value = &info.structure().value;
    assert_eq!({ value.signature }, VS_FIXEDFILEINFO_SIGNATURE);
    assert_eq!({ value.file_flags_mask }, 0, "malformed hex degrades to zero");
    assert_eq!({ value.file_os }, 0x40004);
}

#[test]
fn build_string_entries() {
    init_logger();

    let info = build(CONFIG_PATH_CMD);
    let strings = &info.structure().string_file_info.table.strings;
    assert_eq!(strings.len(), 8, "empty strings are omitted");

    let company = &strings[0];
    assert_eq!(company.key, "CompanyName".encode_utf16().flat_map(u16::to_le_bytes).collect::<Vec<_>>());
    // "Company, Inc." and terminator
    assert_eq!({ company.header.value_length }, 14);
    assert_eq!({ company.header.type_ }, VS_TYPE_TEXT);
    for string in strings {
        let padded = string.key.len() + 6 + string.padding1.len();
        assert_eq!(padded % 4, 0, "string values are aligned");
        assert!((1..=4).contains(&string.padding1.len()));
        assert!(string.padding2.len() < 4);
    }

    let var = &info.structure().var_file_info.value;
    assert_eq!(var.value, 0x04b00409);
    assert_eq!({ var.header.length }, 36);
}

#[test]
fn parse_translation_formats() {
    init_logger();

    let hex = VersionDocument::from_json(indoc! {r#"
        {
            "StringFileInfo": { "ProductName": "Translation" },
            "VarFileInfo": { "Translation": { "LangID": "0409", "CharsetID": "04B0" } }
        }
    "#})
    .unwrap();
    let integer = VersionDocument::from_json(indoc! {r#"
        {
            "StringFileInfo": { "ProductName": "Translation" },
            "VarFileInfo": { "Translation": { "LangID": 1033, "CharsetID": 1200 } }
        }
    "#})
    .unwrap();
    assert_eq!(hex, integer);
    assert_eq!(hex.var_file_info.translation, Translation::new(LANGUAGE_ID_EN_US, CODE_PAGE_ID_EN_US));
    assert_eq!(
        VersionInfo::build(hex).unwrap().buffer(),
        VersionInfo::build(integer).unwrap().buffer()
    );
}

#[test]
fn parse_document_defaults() {
    init_logger();

    let document = VersionDocument::from_json("{}").unwrap();
    assert_eq!(document, VersionDocument::default());
    assert!(!document.timestamp);
    assert!(document.icon_path.is_none());

    let document = build(CONFIG_PATH_EXPLORER).document().clone();
    assert!(document.timestamp, "timestamp is read");
    assert_eq!(document.fixed_file_info.file_version, FileVersion::new(10, 0, 19041, 1));
}

#[test]
fn parse_document_malformed() {
    init_logger();

    let result = VersionDocument::from_file(CONFIG_PATH_BAD);
    assert!(matches!(result, Err(ConfigError::Json(_))), "malformed json is rejected");

    let result = VersionDocument::from_file("./tests/assets/missing.json");
    assert!(matches!(result, Err(ConfigError::IOError(_))));

    let result = VersionDocument::from_json(r#"{ "FixedFileInfo": { "FileVersion": { "Major": 65536 } } }"#);
    assert!(result.is_err(), "version numbers are 16 bit");
}

#[test]
fn encode_values() {
    assert_eq!(version_high(6, 3), "00060003");
    assert_eq!(version_low(9600, 17284), "25804384");
    assert_eq!(FileVersion::new(6, 3, 9600, 17284).version_string(), "6.3.9600.17284");
    assert_eq!(FileVersion::new(6, 3, 9600, 17284).to_string(), "6.3.9600.17284");
    assert_eq!(version_string(0x00060003, 0x25804384), "6.3.9600.17284");
    assert_eq!(translation_string(0x0409, 0x04b0), "040904B0");
    assert_eq!(translation(0x0409, 0x04b0), "04b00409");
    assert_eq!(Translation::new(0x0409, 0x04b0).translation(), 0x04b00409);
}

#[rstest]
#[case("", 0)]
#[case("3f", 0x3f)]
#[case("04B0", 0x4b0)]
#[case("040004", 0x40004)]
#[case("ffffffff", u32::MAX)]
#[case("zz", 0)]
#[case("100000000", 0)]
fn encode_hex(#[case] value: &str, #[case] expected: u32) {
    init_logger();

    assert_eq!(hex_to_u32(value), expected);
}

#[test]
fn container_ids() {
    init_logger();

    let mut container = ResourceContainer::new();
    assert_eq!(container.next_id().unwrap(), 1);
    assert_eq!(container.next_id().unwrap(), 2);

    container.add_resource(RT_VERSION, 1, Buffer::new(vec![1, 2, 3])).unwrap();
    let result = container.add_resource(RT_MANIFEST, 1, Buffer::new(vec![4]));
    assert!(matches!(result, Err(ResourceError::DuplicateId(1))), "ids are unique across types");

    let result = container.serialize(Architecture::I386);
    assert!(matches!(result, Err(ResourceError::NotFrozen)));

    container.freeze();
    assert!(container.is_frozen());
    let result = container.add_resource(RT_MANIFEST, 2, Buffer::new(vec![4]));
    assert!(matches!(result, Err(ResourceError::Frozen)), "frozen container is immutable");
    assert_eq!(container.resources().len(), 1);
}

#[derive(Debug)]
struct ReservedPayload(u64);
impl Payload for ReservedPayload {
    fn size(&self) -> u64 { self.0 }

    fn write_to(&self, _writer: &mut dyn Write) -> io::Result<()> { Ok(()) }
}

#[test]
fn container_size_limit() {
    init_logger();

    let mut container = ResourceContainer::new();
    container.add_resource(RT_MANIFEST, 1, ReservedPayload(0xC000_0000)).unwrap();
    let result = container.add_resource(RT_MANIFEST, 2, ReservedPayload(0x4000_0000));
    assert!(
        matches!(result, Err(ResourceError::PayloadTooLarge(0x4000_0000))),
        "section larger than 4 GiB is rejected"
    );
    let result = container.add_resource(RT_MANIFEST, 3, ReservedPayload(0x1_0000_0000));
    assert!(matches!(result, Err(ResourceError::PayloadTooLarge(_))));
    container.add_resource(RT_MANIFEST, 4, ReservedPayload(0x1000)).unwrap();
    assert_eq!(container.resources().len(), 2);
}

#[test]
fn container_ids_exhausted() {
    let mut container = ResourceContainer::new();
    for id in 1..u16::MAX {
        assert_eq!(container.next_id().unwrap(), id);
    }
    assert!(matches!(container.next_id(), Err(ResourceError::IdsExhausted)));
}

#[rstest]
#[case(Architecture::I386, 0x14c, 0x0104, 7)]
#[case(Architecture::Amd64, 0x8664, 0x0004, 3)]
#[case(Architecture::Arm, 0x1c4, 0x0104, 2)]
#[case(Architecture::Arm64, 0xaa64, 0x0004, 2)]
fn build_object(
    #[case] architecture: Architecture, #[case] machine: u16, #[case] characteristics: u16,
    #[case] relocation_type: u16,
) {
    init_logger();

    let info = build(CONFIG_PATH_CMD);
    let object = info.object(architecture).unwrap();

    let header = coff_header(&object);
    assert_eq!({ header.machine }, machine);
    assert_eq!({ header.characteristics }, characteristics);
    assert_eq!({ header.number_of_sections }, 1);
    assert_eq!({ header.number_of_symbols }, 1);

    let section = section_header(&object);
    assert_eq!(section.name().as_deref(), Some(".rsrc"));
    assert_eq!({ section.pointer_to_raw_data }, SECTION_OFFSET as u32);
    // three directory levels, one data entry and the aligned version data
    assert_eq!({ section.size_of_raw_data }, 88 + 824);
    assert_eq!({ section.number_of_relocations }, 1);
    assert_eq!({ section.characteristics }, IMAGE_SCN_CNT_INITIALIZED_DATA | IMAGE_SCN_MEM_READ);

    let entry = data_entry(&object, 72);
    assert_eq!({ entry.data_rva }, 88);
    assert_eq!({ entry.size }, 824);
    let data = &object[SECTION_OFFSET + 88..SECTION_OFFSET + 88 + 824];
    assert_eq!(data, info.buffer(), "version info is embedded unchanged");

    let relocation_offset = { section.pointer_to_relocations } as usize;
    let relocation = CoffRelocation::read_from_prefix(&object[relocation_offset..]).unwrap().0;
    assert_eq!({ relocation.virtual_address }, 72);
    assert_eq!({ relocation.symbol_table_index }, 0);
    assert_eq!({ relocation.type_ }, relocation_type);

    let symbol_offset = { header.pointer_to_symbol_table } as usize;
    assert_eq!(symbol_offset, relocation_offset + 10);
    let symbol = CoffSymbol::read_from_prefix(&object[symbol_offset..]).unwrap().0;
    assert_eq!(symbol.name, RESOURCE_SECTION_NAME);
    assert_eq!({ symbol.section_number }, 1);
    assert_eq!(symbol.storage_class, IMAGE_SYM_CLASS_STATIC);

    assert_eq!(&object[symbol_offset + 18..], &4u32.to_le_bytes(), "empty string table");
    assert_eq!(object.len(), 20 + 40 + 912 + 10 + 18 + 4);
}

#[test]
fn build_object_all_architectures() {
    init_logger();

    let info = build(CONFIG_PATH_EXPLORER);
    let container = info.resources().unwrap();
    let objects = Architecture::ALL
        .iter()
        .map(|&architecture| container.serialize(architecture).unwrap())
        .collect::<Vec<_>>();
    for object in &objects {
        let section = section_header(object);
        let start = SECTION_OFFSET;
        let end = start + { section.size_of_raw_data } as usize;
        assert_eq!(object[start..end], objects[0][start..end], "resource content is identical");
    }
    assert_eq!(Architecture::from_name("arm64"), Some(Architecture::Arm64));
    assert_eq!(Architecture::from_name("x86"), None);
}

#[test]
fn write_object() {
    init_logger();

    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("resource.syso");
    let info = build(CONFIG_PATH_CMD);
    info.write_object(&path, Architecture::Amd64).unwrap();
    assert_eq!(fs::read(&path).unwrap(), info.object(Architecture::Amd64).unwrap());
}

#[test]
fn parse_icon() {
    init_logger();

    let header = IconHeader::parse_file(ICON_PATH).unwrap();
    assert_eq!({ header.directory.count }, 2);
    assert_eq!(header.entries[0].width, 16);
    assert_eq!({ header.entries[0].bytes }, 1128);
    assert_eq!({ header.entries[0].image_offset }, 38);
    assert_eq!(header.entries[1].width, 32);
    assert_eq!({ header.entries[1].bytes }, 4264);
}

#[test]
fn parse_icon_invalid() {
    init_logger();

    let data = fs::read(ICON_PATH).unwrap();
    let result = IconHeader::parse(&mut Cursor::new(&data[..10]), 10);
    assert!(matches!(result, Err(ResourceError::InvalidIcon(_))), "truncated directory");

    let mut data = vec![0, 0, 1, 0, 1, 0];
    data.extend([16, 16, 0, 0, 1, 0, 32, 0]);
    data.extend(100u32.to_le_bytes());
    data.extend(1000u32.to_le_bytes());
    let size = data.len() as u64;
    let result = IconHeader::parse(&mut Cursor::new(&data), size);
    assert!(matches!(result, Err(ResourceError::InvalidIcon(_))), "image outside of file");

    let data = [0u8, 0, 2, 0, 0, 0];
    let result = IconHeader::parse(&mut Cursor::new(&data), 6);
    assert!(matches!(result, Err(ResourceError::InvalidIcon(_))), "cursor type is rejected");
}

#[test]
fn add_icon_resources() {
    init_logger();

    let mut document = VersionDocument::from_file(CONFIG_PATH_CMD).unwrap();
    document.icon_path = Some(PathBuf::from(ICON_PATH));
    let info = VersionInfo::build(document).unwrap();
    let container = info.resources().unwrap();

    let version = container.resources_of_type(RT_VERSION).map(Resource::id).collect::<Vec<_>>();
    assert_eq!(version, [1], "version info takes the first id");
    let icons = container.resources_of_type(RT_ICON).collect::<Vec<_>>();
    assert_eq!(icons.iter().map(|icon| icon.id()).collect::<Vec<_>>(), [2, 3]);
    assert_eq!(icons.iter().map(|icon| icon.size()).collect::<Vec<_>>(), [1128, 4264]);
    let groups = container.resources_of_type(RT_GROUP_ICON).collect::<Vec<_>>();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].id(), 4);
    assert_eq!(groups[0].size(), 6 + 2 * 14);

    let mut group = Vec::new();
    groups[0].payload().write_to(&mut group).unwrap();
    assert_eq!(&group[..6], &[0, 0, 1, 0, 2, 0]);
    let entry = IconDirectoryEntry::read_from_prefix(&group[6 + 14..]).unwrap().0;
    assert_eq!(entry.width, 32);
    assert_eq!({ entry.bytes }, 4264);
    assert_eq!({ entry.id }, 3);

    let object = container.serialize(Architecture::I386).unwrap();
    let icon = fs::read(ICON_PATH).unwrap();
    let start = icon.len() - 4264;
    let last_image = &icon[start..];
    assert!(
        object.windows(last_image.len()).any(|window| window == last_image),
        "icon image is embedded"
    );
    assert_eq!({ section_header(&object).number_of_relocations }, 4);
}

#[test]
fn add_icon_empty() {
    init_logger();

    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("empty.ico");
    fs::write(&path, [0u8, 0, 1, 0, 0, 0]).unwrap();

    let mut container = ResourceContainer::new();
    assert_eq!(add_icon(&mut container, &path).unwrap(), None);
    assert!(container.resources().is_empty());
}

#[rstest]
#[case(CONFIG_PATH_BAD)]
#[case("./tests/assets/missing.ico")]
fn write_object_invalid_icon(#[case] icon: &str) {
    init_logger();

    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("resource.syso");
    let mut document = VersionDocument::from_file(CONFIG_PATH_CMD).unwrap();
    document.icon_path = Some(PathBuf::from(icon));
    let info = VersionInfo::build(document).unwrap();

    let result = info.write_object(&path, Architecture::Amd64);
    assert!(matches!(result, Err(WriteError::Resource(_))), "invalid icon aborts the build");
    assert!(!path.exists(), "no output is written");
}

#[test]
fn add_missing_file() {
    init_logger();

    let mut container = ResourceContainer::new();
    let result = add_icon(&mut container, "./tests/assets/missing.ico");
    match result {
        Err(error @ ResourceError::OpenFile(..)) => {
            assert!(error.to_string().contains("missing.ico"), "error names the icon: {}", error)
        }
        result => panic!("unexpected result: {:?}", result),
    }

    let result = add_manifest(&mut container, "./tests/assets/missing.manifest");
    assert!(
        matches!(&result, Err(ResourceError::OpenFile(path, _)) if path.ends_with("missing.manifest")),
        "error names the manifest"
    );
}

#[test]
fn add_manifest_resource() {
    init_logger();

    let mut document = VersionDocument::from_file(CONFIG_PATH_CMD).unwrap();
    document.manifest_path = Some(PathBuf::from(MANIFEST_PATH));
    document.icon_path = Some(PathBuf::from(ICON_PATH));
    let info = VersionInfo::build(document).unwrap();
    let container = info.resources().unwrap();

    let manifests = container.resources_of_type(RT_MANIFEST).collect::<Vec<_>>();
    assert_eq!(manifests.len(), 1);
    assert_eq!(manifests[0].id(), 2, "manifest takes the id after the version info");
    assert_eq!(container.resources().len(), 5);

    let object = container.serialize(Architecture::Arm64).unwrap();
    let manifest = fs::read(MANIFEST_PATH).unwrap();
    assert!(object.windows(manifest.len()).any(|window| window == &manifest[..]));

    let container = info.resources_with(false).unwrap();
    assert_eq!(container.resources_of_type(RT_VERSION).count(), 0, "version info is skipped");
    assert_eq!(container.resources_of_type(RT_MANIFEST).map(Resource::id).collect::<Vec<_>>(), [1]);
}

#[test]
fn read_file_range_lazily() {
    init_logger();

    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("data.bin");
    fs::write(&path, b"hello").unwrap();

    let mut container = ResourceContainer::new();
    let id = container.next_id().unwrap();
    container.add_resource(RT_MANIFEST, id, FileRange::open(&path).unwrap()).unwrap();
    container.freeze();
    assert_eq!(container.section_size(), Some(88 + 8));

    fs::write(&path, b"world").unwrap();
    let object = container.serialize(Architecture::Amd64).unwrap();
    let data = &object[SECTION_OFFSET + 88..SECTION_OFFSET + 96];
    assert_eq!(data, b"world\0\0\0", "data is read when serialized and padded to 8 bytes");
}

#[derive(Debug)]
struct ShortPayload;
impl Payload for ShortPayload {
    fn size(&self) -> u64 { 4 }

    fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> { writer.write_all(&[1, 2]) }
}

#[test]
fn walk_payload_size_mismatch() {
    init_logger();

    let mut container = ResourceContainer::new();
    container.add_resource(RT_MANIFEST, 1, ShortPayload).unwrap();
    container.freeze();
    let result = container.serialize(Architecture::I386);
    assert!(matches!(result, Err(ResourceError::IOError(_))), "short payload is detected");
}

#[test]
fn write_hex() {
    init_logger();

    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("versioninfo.hex");
    let info = build(CONFIG_PATH_CMD);
    info.write_hex(&path).unwrap();
    assert_eq!(fs::read(&path).unwrap(), info.buffer());
}

#[test]
fn write_source() {
    init_logger();

    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("versioninfo.rs");
    let info = build(CONFIG_PATH_EXPLORER);
    info.write_source(&path).unwrap();

    let source = fs::read_to_string(&path).unwrap();
    assert!(source.starts_with("// Code generated by verinfo. DO NOT EDIT."));
    let start = source.find("r#\"").unwrap() + 3;
    let end = source.rfind("\"#;").unwrap();
    let document = VersionDocument::from_json(&source[start..end]).unwrap();
    assert_eq!(&document, info.document(), "embedded json parses to the same document");
}

#[test]
fn write_source_hashes() {
    init_logger();

    let mut document = VersionDocument::default();
    document.string_file_info.comments = "\"## quoted".to_string();
    let info = VersionInfo::build(document).unwrap();
    let source = info.source().unwrap();
    assert!(source.contains("= r###\""), "raw string delimiter is longer than any quote run");
    assert!(source.ends_with("\"###;\n"));
}
