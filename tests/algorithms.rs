use proptest::prelude::*;
use sortbench::engine::{sort_records, Cancelled, SortControl};
use sortbench::model::{Algorithm, Record, SortColumn, SortOrder};

#[derive(Default)]
struct Progress {
    events: Vec<(usize, usize)>,
}

impl SortControl for Progress {
    fn progress(&mut self, processed: usize, total: usize) {
        self.events.push((processed, total));
    }

    fn checkpoint(&mut self) -> Result<(), Cancelled> {
        Ok(())
    }
}

fn sort_ints(algorithm: Algorithm, data: &[i32]) -> (Vec<i32>, Vec<(usize, usize)>) {
    let mut ctl = Progress::default();
    let sorted = algorithm
        .sort(data, &mut |a: &i32, b: &i32| a < b, &mut ctl)
        .unwrap();
    (sorted, ctl.events)
}

#[test]
fn every_algorithm_sorts_the_example() {
    for algorithm in Algorithm::ALL {
        let (sorted, events) = sort_ints(algorithm, &[5, 3, 1, 4, 2]);
        assert_eq!(sorted, vec![1, 2, 3, 4, 5], "{algorithm}");
        assert_eq!(events.last(), Some(&(5, 5)), "{algorithm}");
    }
}

#[test]
fn empty_input_reports_done_once() {
    for algorithm in Algorithm::ALL {
        let (sorted, events) = sort_ints(algorithm, &[]);
        assert!(sorted.is_empty());
        assert_eq!(events, vec![(0, 0)], "{algorithm}");
    }
}

#[test]
fn input_is_left_untouched() {
    let data = vec![3, 1, 2];
    for algorithm in Algorithm::ALL {
        let _ = sort_ints(algorithm, &data);
        assert_eq!(data, vec![3, 1, 2]);
    }
}

#[test]
fn records_sort_by_name_case_insensitively() {
    let records = vec![
        Record::new(1, "carol", "Smith"),
        Record::new(2, "Alice", "jones"),
        Record::new(3, "bob", "Adams"),
    ];
    for algorithm in Algorithm::ALL {
        let mut ctl = Progress::default();
        let sorted = sort_records(
            &records,
            algorithm,
            SortColumn::FirstName,
            SortOrder::Ascending,
            &mut ctl,
        )
        .unwrap();
        let ids: Vec<i64> = sorted.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1], "{algorithm}");

        let mut ctl = Progress::default();
        let sorted = sort_records(
            &records,
            algorithm,
            SortColumn::LastName,
            SortOrder::Descending,
            &mut ctl,
        )
        .unwrap();
        let ids: Vec<i64> = sorted.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3], "{algorithm}");
    }
}

#[test]
fn large_random_input_matches_std_sort() {
    use rand::{rngs::StdRng, Rng, SeedableRng};
    let mut rng = StdRng::seed_from_u64(7);
    let data: Vec<i32> = (0..10_000).map(|_| rng.gen_range(-1000..1000)).collect();
    let mut expected = data.clone();
    expected.sort();

    for algorithm in [Algorithm::Insertion, Algorithm::Merge] {
        let (sorted, events) = sort_ints(algorithm, &data);
        assert_eq!(sorted, expected, "{algorithm}");
        assert!(events.windows(2).all(|w| w[0].0 <= w[1].0), "{algorithm}");
    }
}

proptest! {
    #[test]
    fn output_is_a_sorted_permutation(data in prop::collection::vec(-50i32..50, 0..120)) {
        let mut expected = data.clone();
        expected.sort();
        for algorithm in Algorithm::ALL {
            let (sorted, events) = sort_ints(algorithm, &data);
            prop_assert_eq!(&sorted, &expected);
            prop_assert_eq!(events.last().copied(), Some((data.len(), data.len())));
            prop_assert!(events.windows(2).all(|w| w[0].0 <= w[1].0));
            prop_assert!(events.iter().all(|&(p, t)| p <= t && t == data.len()));
        }
    }

    #[test]
    fn stable_algorithms_keep_equal_keys_in_order(keys in prop::collection::vec(0u8..5, 0..80)) {
        let tagged: Vec<(u8, usize)> = keys.iter().copied().zip(0..).collect();
        let mut expected = tagged.clone();
        expected.sort_by_key(|&(k, _)| k);
        for algorithm in Algorithm::ALL.into_iter().filter(|a| a.is_stable()) {
            let mut ctl = Progress::default();
            let sorted = algorithm
                .sort(&tagged, &mut |a: &(u8, usize), b: &(u8, usize)| a.0 < b.0, &mut ctl)
                .unwrap();
            prop_assert_eq!(&sorted, &expected);
        }
    }

    #[test]
    fn sorting_twice_changes_nothing(data in prop::collection::vec(any::<i16>(), 0..60)) {
        for algorithm in Algorithm::ALL {
            let mut first = Progress::default();
            let once = algorithm.sort(&data, &mut |a: &i16, b: &i16| a < b, &mut first).unwrap();
            let mut second = Progress::default();
            let twice = algorithm.sort(&once, &mut |a: &i16, b: &i16| a < b, &mut second).unwrap();
            prop_assert_eq!(once, twice);
            prop_assert_eq!(first.events.last(), second.events.last());
        }
    }
}
