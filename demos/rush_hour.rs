use station_index::{
    Expression, ScoreWeights, StationDefaults, StationEvent, StationIndex, StationRecord,
};
use tracing_subscriber::EnvFilter;

const WEIGHTS: ScoreWeights = ScoreWeights::new(2, 1, 1);

fn print_top_k(index: &StationIndex, k: usize, weights: ScoreWeights) {
    println!(
        "  Top-{k} stations (score = {}*slots + {}*power - {}*price):",
        weights.alpha, weights.beta, weights.gamma
    );
    let best = index.top_k_scored(k, weights).unwrap();
    for (rank, candidate) in best.iter().enumerate() {
        if let Some(record) = index.find(candidate.station_id) {
            println!(
                "    #{} - station {}: slots={}, power={}kW, price={}c, score={}",
                rank + 1,
                candidate.station_id,
                record.slots_free,
                record.power_kw,
                record.price_cents,
                candidate.score
            );
        }
    }
}

fn print_statistics(index: &StationIndex) {
    println!("  Stations >= 100kW: {}", index.count_at_least(100));
    println!(
        "  Stations in [1100, 1150]: {}",
        index.range_keys(1100, 1150, 100).len()
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut index: StationIndex = (0..300)
        .map(|i| {
            let power_kw = [22, 50, 100, 150, 350][i % 5];
            let price_cents = 180 + (i as i32 * 37) % 400;
            let slots_free = (i as i32 * 7) % 6;
            (1001 + i as i64, StationRecord::new(power_kw, price_cents, slots_free, 0))
        })
        .collect();
    println!("Loaded {} stations", index.len());

    println!("\nBefore rush hour");
    print_top_k(&index, 5, WEIGHTS);
    print_statistics(&index);

    let events: Vec<_> = (0..150)
        .map(|i| {
            let (timestamp, vehicle_id, station_id) = (100 + i, 10 + (i % 50) as u32, 1001 + (i % 300));
            if i % 3 == 0 {
                StationEvent::plug_out(timestamp, vehicle_id, station_id)
            } else {
                StationEvent::plug_in(timestamp, vehicle_id, station_id)
            }
        })
        .collect();
    let applied = index.apply_events(&events, &StationDefaults::default());
    println!("\nApplied {applied} events");

    println!("\nAfter rush hour");
    print_top_k(&index, 5, WEIGHTS);
    print_statistics(&index);

    println!("\nZone [1100, 1110]");
    for key in index.range_keys(1100, 1110, 20) {
        if let Some(record) = index.find(key) {
            println!(
                "  station {key}: {} free slots, {}kW",
                record.slots_free, record.power_kw
            );
        }
    }

    println!("\nMost available stations");
    print_top_k(&index, 3, ScoreWeights::new(10, 1, 1));

    let rule = Expression::parse("slots 1 >= power 22 >= &&").unwrap();
    println!("\nFirst stations matching `{rule}`");
    for key in index.filter(&rule, 5) {
        println!("  station {key}");
    }

    if let (Some(minimum), Some(maximum)) = (index.minimum(), index.maximum()) {
        println!(
            "\nLowest id: {} ({}kW), highest id: {} ({}kW)",
            minimum.key(),
            minimum.record().power_kw,
            maximum.key(),
            maximum.record().power_kw
        );
    }

    let small: StationIndex = index
        .range_keys(1001, 1007, 7)
        .into_iter()
        .filter_map(|key| index.find(key).map(|record| (key, *record)))
        .collect();
    println!("\nTree of the first seven stations:\n{}", small.sideways());

    index.clear();
    println!("Cleared, {} stations left", index.len());
}
