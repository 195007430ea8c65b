use std::fs;

use crate::{
    align_up, EncodedFsTable, Entry, FileData, FsTable, Node, Tree, ENTRY_SIZE, FILE_ALIGNMENT,
    FS_TABLE_ALIGNMENT,
};

fn sample_tree() -> Tree {
    Tree::from_nodes(vec![
        Node::file("a.bin", 4, "a.bin"),
        Node::directory(
            "audio",
            vec![
                Node::directory("bgm", vec![Node::file("title.hps", 0x1_2345, "title.hps")]),
                Node::directory("empty", vec![]),
                Node::file("se.ssm", 17, "se.ssm"),
            ],
        ),
        Node::file("opening.bnr", 0x1960, "opening.bnr"),
        Node::file("zero.dat", 0, "zero.dat"),
    ])
}

fn next_random(state: &mut u32) -> u32 {
    *state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
    *state >> 16
}

/// A deterministic tree with a mix of depths, empty directories and odd file sizes.
fn generated_tree(depth: u32, state: &mut u32) -> Vec<Node> {
    let count = next_random(state) % 5;
    let mut nodes = Vec::new();
    for i in 0..count {
        let roll = next_random(state);
        if depth > 0 && roll % 3 == 0 {
            let children = generated_tree(depth - 1, state);
            nodes.push(Node::directory(format!("dir{}", i), children));
        } else {
            let size = roll % 0x300;
            nodes.push(Node::file(format!("file{}.bin", i), size, format!("file{}", i)));
        }
    }
    nodes
}

fn trees() -> Vec<Tree> {
    let mut state = 0x5eed;
    let mut trees = vec![Tree::default(), sample_tree()];
    for _ in 0..8 {
        trees.push(Tree::from_nodes(generated_tree(4, &mut state)));
    }
    trees
}

fn parse_entries(raw: &[u8]) -> Vec<Entry> {
    let count = Entry::parse(raw).end_index() as usize;
    (0..count)
        .map(|index| Entry::parse(&raw[index * ENTRY_SIZE..]))
        .collect()
}

fn tree_files(tree: &Tree) -> Vec<(String, u32)> {
    fn visit(prefix: &str, nodes: &[Node], out: &mut Vec<(String, u32)>) {
        for node in nodes {
            match node {
                Node::File { name, size, .. } => out.push((format!("{}{}", prefix, name), *size)),
                Node::Directory { name, children } => {
                    visit(&format!("{}{}/", prefix, name), children, out)
                }
            }
        }
    }
    let mut out = Vec::new();
    visit("", tree.children(), &mut out);
    out
}

#[test]
fn round_trip_preserves_files_and_offsets() {
    for (i, tree) in trees().iter().enumerate() {
        let encoded = EncodedFsTable::encode(tree, 0x4_5678 + i as u32 * 4).unwrap();
        let decoded = FsTable::decode(encoded.raw()).unwrap();

        let planned: Vec<FileData> = encoded.files().iter().map(|p| p.file.clone()).collect();
        assert_eq!(decoded.files(), &planned[..]);

        let decoded_files: Vec<_> = decoded
            .files()
            .iter()
            .map(|file| (file.path.clone(), file.size))
            .collect();
        assert_eq!(decoded_files, tree_files(tree));

        // One path per node plus the root.
        assert_eq!(decoded.entries().len(), tree.entry_count() + 1);
    }
}

#[test]
fn decode_only_needs_the_unpadded_table() {
    let encoded = EncodedFsTable::encode(&sample_tree(), 0x3000).unwrap();
    let unpadded = &encoded.raw()[..encoded.raw_size() as usize];
    assert_eq!(FsTable::decode(unpadded).unwrap().files().len(), 5);
}

#[test]
fn directory_ranges_nest() {
    for tree in trees() {
        let encoded = EncodedFsTable::encode(&tree, 0).unwrap();
        let entries = parse_entries(encoded.raw());

        for (i, dir) in entries.iter().enumerate().filter(|(_, e)| e.is_dir()) {
            let end = dir.end_index() as usize;
            assert!(end > i && end <= entries.len());
            for (j, inner) in entries.iter().enumerate().take(end).skip(i + 1) {
                if !inner.is_dir() {
                    continue;
                }
                assert!(inner.end_index() as usize <= end);
                let mut ancestor = inner.parent_index() as usize;
                while ancestor > i {
                    assert!(ancestor < j);
                    ancestor = entries[ancestor].parent_index() as usize;
                }
                assert_eq!(ancestor, i, "entry {} escapes directory {}", j, i);
            }
        }
    }
}

#[test]
fn file_offsets_are_aligned_and_increasing() {
    for tree in trees() {
        let encoded = EncodedFsTable::encode(&tree, 0x1_2344).unwrap();
        let mut minimum = 0x1_2344 + encoded.size();
        assert_eq!(minimum % FS_TABLE_ALIGNMENT, 0);
        for placement in encoded.files() {
            let file = &placement.file;
            assert_eq!(file.offset % FILE_ALIGNMENT, 0);
            assert!(file.offset >= minimum);
            minimum = align_up(file.offset + file.size, FILE_ALIGNMENT).unwrap();
        }
    }
}

#[test]
fn sizes_are_consistent() {
    for tree in trees() {
        for &offset in &[0, 0x2440, 0x4_5681, 0x10_00ff] {
            let encoded = EncodedFsTable::encode(&tree, offset).unwrap();
            let entries = parse_entries(encoded.raw());
            let names: usize = tree.iter().map(|node| node.name().len() + 1).sum();

            assert_eq!(
                encoded.raw_size() as usize,
                entries.len() * ENTRY_SIZE + names
            );
            assert_eq!(encoded.size() as usize, encoded.raw().len());
            assert!(encoded.size() - encoded.raw_size() < FS_TABLE_ALIGNMENT);
            assert_eq!((offset + encoded.size()) % FS_TABLE_ALIGNMENT, 0);
            assert_eq!(encoded.raw_size(), crate::raw_size(&tree).unwrap());
        }
    }
}

#[test]
fn scanned_directory_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.bin"), b"abcd").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("b.bin"), b"ef").unwrap();

    let tree = Tree::scan(dir.path()).unwrap();
    let encoded = EncodedFsTable::encode(&tree, 0x1000).unwrap();
    let entries = parse_entries(encoded.raw());
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].end_index(), 4);
    assert_eq!(entries[2].end_index(), 4);

    let sources: Vec<_> = encoded.files().iter().map(|p| p.source.clone()).collect();
    assert_eq!(
        sources,
        [dir.path().join("a.bin"), dir.path().join("sub").join("b.bin")]
    );

    let decoded = FsTable::decode(encoded.raw()).unwrap();
    let files: Vec<_> = decoded
        .files()
        .iter()
        .map(|file| (file.path.as_str(), file.size, file.offset))
        .collect();
    assert_eq!(files, [("a.bin", 4, 0x1100), ("sub/b.bin", 2, 0x1110)]);
}
