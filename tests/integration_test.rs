//! Black-box end-to-end scenarios: create-and-open, single insert,
//! duplicate, leaf split, root promotion, cursor traversal, reopen, and
//! a corrupt header.

use chipager::btree::cursor::Cursor;
use chipager::dbheader;
use chipager::engine::Engine;
use chipager::error::Error;
use chipager::pager::PagerConfig;

fn temp_path(name: &str) -> String {
    let mut p = std::env::temp_dir();
    p.push(format!(
        "chipager-integration-{name}-{}",
        std::process::id()
    ));
    p.to_string_lossy().into_owned()
}

#[test]
fn create_and_open_materializes_a_valid_empty_database() {
    let path = temp_path("create-and-open");
    let _ = std::fs::remove_file(&path);

    let engine = Engine::open(&path, PagerConfig::default()).expect("should create a fresh file");
    engine.close().unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), PagerConfig::default().page_size as usize);
    assert_eq!(&bytes[0..16], &dbheader::MAGIC[..]);
    assert_eq!(
        u16::from_be_bytes([bytes[16], bytes[17]]),
        PagerConfig::default().page_size as u16
    );
    assert_eq!(
        u32::from_be_bytes([bytes[48], bytes[49], bytes[50], bytes[51]]),
        20000
    );
    // Page 1's own header starts at offset 100: an empty TABLE_LEAF (0x0D)
    // with zero cells and cells_offset at the end of the page.
    assert_eq!(bytes[100], 0x0D);
    assert_eq!(u16::from_be_bytes([bytes[103], bytes[104]]), 0);
    assert_eq!(
        u16::from_be_bytes([bytes[105], bytes[106]]),
        PagerConfig::default().page_size as u16
    );

    std::fs::remove_file(&path).ok();
}

#[test]
fn single_insert_then_find_round_trips() {
    let path = temp_path("single-insert");
    let _ = std::fs::remove_file(&path);
    let mut engine = Engine::open(&path, PagerConfig::default()).unwrap();

    engine
        .insert_in_table(1, 42, vec![0xAA, 0xBB, 0xCC])
        .unwrap();

    assert_eq!(engine.find(1, 42).unwrap(), vec![0xAA, 0xBB, 0xCC]);
    assert!(matches!(engine.find(1, 41), Err(Error::NotFound)));

    engine.close().unwrap();
    std::fs::remove_file(&path).ok();
}

#[test]
fn duplicate_insert_is_rejected_and_file_is_unchanged() {
    let path = temp_path("duplicate");
    let _ = std::fs::remove_file(&path);
    let mut engine = Engine::open(&path, PagerConfig::default()).unwrap();
    engine.insert_in_table(1, 42, vec![0xAA, 0xBB, 0xCC]).unwrap();
    engine.close().unwrap();

    let before = std::fs::read(&path).unwrap();

    let mut engine = Engine::open(&path, PagerConfig::default()).unwrap();
    let err = engine.insert_in_table(1, 42, vec![0x00]).unwrap_err();
    assert!(matches!(err, Error::Duplicate));
    engine.close().unwrap();

    let after = std::fs::read(&path).unwrap();
    assert_eq!(before, after);

    std::fs::remove_file(&path).ok();
}

#[test]
fn leaf_split_produces_an_internal_root_with_two_leaf_children() {
    let path = temp_path("leaf-split");
    let _ = std::fs::remove_file(&path);
    let mut engine = Engine::open(&path, PagerConfig { page_size: 1024 }).unwrap();

    // 200-byte payloads: a 1024-byte leaf overflows after a handful of
    // keys (header + a few 208-byte cells + offset-array entries).
    let mut k = 1u32;
    loop {
        engine
            .insert_in_table(1, k, vec![0xCDu8; 200])
            .unwrap_or_else(|e| panic!("unexpected insert error before any split: {e}"));
        k += 1;
        let root = chipager::btree::node::Node::load(engine.pager_mut(), 1).unwrap();
        if root.node_type.is_internal() {
            break;
        }
        assert!(k < 50, "expected a split well before 50 keys at this page size");
    }

    let root = chipager::btree::node::Node::load(engine.pager_mut(), 1).unwrap();
    assert_eq!(root.node_type, chipager::btree::node::NodeType::TableInternal);
    assert_eq!(root.n_cells, 1);
    let left_page = root.get_cell(0).unwrap().child_page().unwrap();
    assert_ne!(
        left_page, 1,
        "splitting the root allocates fresh pages for both halves; page 1 is overwritten with the new interior node"
    );
    let right_page = root.right_page;
    assert_ne!(right_page, 0);

    let left = chipager::btree::node::Node::load(engine.pager_mut(), left_page).unwrap();
    let right = chipager::btree::node::Node::load(engine.pager_mut(), right_page).unwrap();
    assert_eq!(left.node_type, chipager::btree::node::NodeType::TableLeaf);
    assert_eq!(right.node_type, chipager::btree::node::NodeType::TableLeaf);

    for key in 1..k {
        assert_eq!(engine.find(1, key).unwrap(), vec![0xCDu8; 200]);
    }

    engine.close().unwrap();
    std::fs::remove_file(&path).ok();
}

#[test]
fn root_promotion_grows_tree_height_and_preserves_root_page_number() {
    let path = temp_path("root-promotion");
    let _ = std::fs::remove_file(&path);
    let mut engine = Engine::open(&path, PagerConfig { page_size: 1024 }).unwrap();

    for key in 1..300u32 {
        engine.insert_in_table(1, key, vec![0xEFu8; 200]).unwrap();
    }

    let root = chipager::btree::node::Node::load(engine.pager_mut(), 1).unwrap();
    assert_eq!(root.node_type, chipager::btree::node::NodeType::TableInternal);
    let mut found_internal_child = false;
    for i in 0..root.n_cells {
        let child_page = root.get_cell(i).unwrap().child_page().unwrap();
        let child = chipager::btree::node::Node::load(engine.pager_mut(), child_page).unwrap();
        found_internal_child |= child.node_type.is_internal();
    }
    assert!(found_internal_child, "tree should be at least 3 levels deep");

    for key in 1..300u32 {
        assert_eq!(engine.find(1, key).unwrap(), vec![0xEFu8; 200]);
    }

    engine.close().unwrap();
    std::fs::remove_file(&path).ok();
}

#[test]
fn cursor_rewind_and_next_visit_keys_in_order_then_stop() {
    let path = temp_path("cursor-traversal");
    let _ = std::fs::remove_file(&path);
    let mut engine = Engine::open(&path, PagerConfig::default()).unwrap();

    for key in [7u32, 2, 5, 9, 3] {
        engine.insert_in_table(1, key, vec![key as u8]).unwrap();
    }

    let mut cursor: Cursor = engine.new_cursor(1);
    assert!(cursor.rewind(engine.pager_mut()).unwrap());
    let mut seen = Vec::new();
    loop {
        seen.push(cursor.current().unwrap().key());
        if !cursor.next(engine.pager_mut()).unwrap() {
            break;
        }
    }
    assert_eq!(seen, vec![2, 3, 5, 7, 9]);
    assert!(!cursor.next(engine.pager_mut()).unwrap());

    engine.close().unwrap();
    std::fs::remove_file(&path).ok();
}

#[test]
fn reopening_an_existing_database_preserves_its_data() {
    let path = temp_path("reopen");
    let _ = std::fs::remove_file(&path);

    {
        let mut engine = Engine::open(&path, PagerConfig::default()).unwrap();
        engine.insert_in_table(1, 1, vec![1, 2, 3]).unwrap();
        engine.close().unwrap();
    }
    {
        let mut engine = Engine::open(&path, PagerConfig::default()).unwrap();
        assert_eq!(engine.find(1, 1).unwrap(), vec![1, 2, 3]);
        engine.close().unwrap();
    }

    std::fs::remove_file(&path).ok();
}

#[test]
fn corrupt_header_is_rejected_on_open() {
    let path = temp_path("corrupt-header");
    let _ = std::fs::remove_file(&path);
    {
        let engine = Engine::open(&path, PagerConfig::default()).unwrap();
        engine.close().unwrap();
    }
    let mut bytes = std::fs::read(&path).unwrap();
    bytes[0] = b'X'; // corrupt the magic
    std::fs::write(&path, &bytes).unwrap();

    let err = Engine::open(&path, PagerConfig::default()).unwrap_err();
    assert!(matches!(err, Error::CorruptHeader(_)));

    std::fs::remove_file(&path).ok();
}
