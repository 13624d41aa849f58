//! A small demonstration binary: opens (or creates) a chidb-format
//! database file, inserts a handful of rows into its schema-table-free
//! first tree, then walks them in key order with a cursor.

use chipager::btree::node::NodeType;
use chipager::engine::Engine;
use chipager::pager::PagerConfig;

fn main() {
    env_logger::init();

    let path = "./chipager-demo.db";
    let mut engine =
        Engine::open(path, PagerConfig::default()).expect("should have opened or created the DB");

    const ROOT: u32 = 1;
    let rows: &[(u32, &[u8])] = &[
        (7, b"gamma"),
        (2, b"bravo"),
        (5, b"delta"),
        (9, b"epsilon"),
        (3, b"charlie"),
    ];
    for &(key, data) in rows {
        match engine.insert_in_table(ROOT, key, data.to_vec()) {
            Ok(()) => println!("inserted key {key}"),
            Err(chipager::error::Error::Duplicate) => println!("key {key} already present"),
            Err(e) => panic!("unexpected insert error: {e}"),
        }
    }

    println!("\nin key order:");
    let mut cursor = engine.new_cursor(ROOT);
    if cursor.rewind(engine.pager_mut()).expect("rewind should not fail") {
        loop {
            let cell = cursor.current().expect("cursor should be positioned on a cell");
            println!("  key={} size={}", cell.key(), cell.to_owned().byte_size());
            if !cursor.next(engine.pager_mut()).expect("next should not fail") {
                break;
            }
        }
    } else {
        println!("  (tree is empty)");
    }

    let index_root = engine
        .create_tree(NodeType::IndexLeaf)
        .expect("should have allocated an index tree root");
    println!("\ncreated a second (index) tree rooted at page {index_root}");

    engine.close().expect("should have closed cleanly");
}
