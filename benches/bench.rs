// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use criterion::*;

use helio_movie::channel::Channel;
use helio_movie::run::RunOrganizer;
use helio_movie::time::*;

fn frame_paths(c: &mut Criterion) {
    // A day of AIA frames at the full 12 s cadence.
    let start = parse_timestamp("2015/01/17 00:00:00").unwrap();
    let end = parse_timestamp("2015/01/17 23:59:59").unwrap();
    let org = RunOrganizer::new("/data/solar", start);

    c.bench_function("expanding a day at 12 s cadence", |b| {
        b.iter(|| {
            expand_range(start, end, Cadence::Every(chrono::Duration::seconds(12))).unwrap();
        })
    });

    let instants = expand_range(start, end, Cadence::Every(chrono::Duration::seconds(12))).unwrap();
    c.bench_function("naming a day of frames in every channel", |b| {
        b.iter(|| {
            for ch in Channel::ALL.iter() {
                for t in &instants {
                    black_box(org.frame_path(*ch, t));
                }
            }
        })
    });
}

criterion_group!(benches, frame_paths);
criterion_main!(benches);
