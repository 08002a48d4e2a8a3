use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use pagetree::index::btree::{GenericKey, InternalPage, NaturalComparator};
use pagetree::{Page, PageId};

type Key = GenericKey<8>;

/// Page with child 0 and `n` separators `0, 2, 4, ...`.
fn filled_page(n: usize, max_size: usize) -> Page {
    let mut page = Page::new();
    let mut node =
        InternalPage::<_, Key>::init_with_max_size(&mut page, PageId::new(1), PageId::INVALID, max_size);
    node.set_value_at(0, PageId::new(0));
    for i in 0..n {
        node.insert_node_after(
            PageId::new(i as u32),
            &Key::from_integer(i as i64 * 2),
            PageId::new(i as u32 + 1),
        );
    }
    page
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("internal_page_lookup");

    for n in [8usize, 64, 300] {
        let page = filled_page(n, InternalPage::<&Page, Key>::DEFAULT_MAX_SIZE);
        let node = InternalPage::<_, Key>::from_page(&page).unwrap();
        let probes: Vec<Key> = (0..64).map(|i| Key::from_integer(i * 7 % (n as i64 * 2))).collect();

        group.bench_with_input(BenchmarkId::new("lookup", n), &n, |b, _| {
            b.iter(|| {
                for probe in &probes {
                    black_box(node.lookup(probe, &NaturalComparator));
                }
            })
        });
    }

    group.finish();
}

fn bench_split(c: &mut Criterion) {
    let max_size = InternalPage::<&Page, Key>::DEFAULT_MAX_SIZE;

    c.bench_function("internal_page_move_half_to", |b| {
        b.iter_batched(
            || (filled_page(max_size, max_size), Page::new()),
            |(mut page, mut sibling_page)| {
                let mut node = InternalPage::<_, Key>::from_page(&mut page).unwrap();
                let mut sibling = InternalPage::<_, Key>::init_with_max_size(
                    &mut sibling_page,
                    PageId::new(2),
                    PageId::INVALID,
                    max_size,
                );
                node.move_half_to(&mut sibling);
                black_box(sibling.size())
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_lookup, bench_split);
criterion_main!(benches);
