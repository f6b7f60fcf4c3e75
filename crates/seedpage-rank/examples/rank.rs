use seedpage_rank::Ranker;

fn main() {
    let seed = std::env::args().nth(1).unwrap_or_else(seedpage_rank::mint_seed);
    let ranker = Ranker::new(&seed);
    let mut keys: Vec<_> = (1..=23u64).map(|id| ranker.key(id)).collect();
    keys.sort();
    println!("seed={seed}");
    for k in keys { println!("{:>3}  {:.6}", k.id(), k.rank()); }
}
