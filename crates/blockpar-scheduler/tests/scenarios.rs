//! Small blocks with hand-checked graphs, critical paths and makespans

use blockpar_primitives::{Address, H256};
use blockpar_scheduler::{
    highest_cost_path, level_of_parallelization, reduce, schedule, AnalysisConfig,
    BlockAnalyzer, ConflictPolicy, Graph, GraphBuilder,
};
use blockpar_types::{BlockTrace, TxTrace};

fn addr(id: u8) -> Address {
    Address::from_bytes([id; 20])
}

fn reduced(txs: &[TxTrace]) -> Graph {
    let graph = GraphBuilder::default().build(txs).unwrap();
    graph.check_invariants().unwrap();
    reduce(&graph)
}

#[test]
fn empty_block() {
    let graph = reduced(&[]);

    assert_eq!(graph.len(), 0);
    assert_eq!(highest_cost_path(&graph), 0);
    for lanes in 1..=8 {
        assert_eq!(schedule(&graph, lanes).unwrap().makespan, 0);
    }
}

#[test]
fn two_independent_transactions() {
    let graph = reduced(&[
        TxTrace::new(0, 100).writes(addr(1)),
        TxTrace::new(1, 200).writes(addr(2)),
    ]);

    assert_eq!(graph.edge_count(), 0);
    assert_eq!(level_of_parallelization(&graph), 2);
    assert_eq!(highest_cost_path(&graph), 200);
    assert_eq!(schedule(&graph, 2).unwrap().makespan, 200);
    assert_eq!(schedule(&graph, 1).unwrap().makespan, 300);
}

#[test]
fn read_after_write_pair() {
    let graph = reduced(&[
        TxTrace::new(0, 100).writes(addr(1)),
        TxTrace::new(1, 200).reads(addr(1)),
    ]);

    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.node(0).unwrap().edges(), &[1]);
    assert_eq!(highest_cost_path(&graph), 300);
    for lanes in 1..=4 {
        assert_eq!(schedule(&graph, lanes).unwrap().makespan, 300);
    }
}

#[test]
fn join_of_two_writers() {
    let graph = reduced(&[
        TxTrace::new(0, 100).writes(addr(1)),
        TxTrace::new(1, 200).writes(addr(2)),
        TxTrace::new(2, 50).reads(addr(1)).reads(addr(2)),
    ]);

    assert_eq!(graph.edge_count(), 2);
    assert_eq!(highest_cost_path(&graph), 250);

    let result = schedule(&graph, 2).unwrap();
    assert_eq!(result.makespan, 250);
    let starts: Vec<_> = {
        let mut all: Vec<_> = result.assignments().map(|a| (a.job, a.start)).collect();
        all.sort();
        all
    };
    assert_eq!(starts, vec![(0, 0), (1, 0), (2, 200)]);
}

#[test]
fn storage_slot_conflicts_only_on_same_slot() {
    let token = addr(0x70);
    let txs = [
        TxTrace::new(0, 10).writes_slot(token, H256::from_low_u64(1)),
        TxTrace::new(1, 10).writes_slot(token, H256::from_low_u64(2)),
        TxTrace::new(2, 10).reads_slot(token, H256::from_low_u64(1)),
    ];

    let graph = reduced(&txs);
    assert_eq!(graph.node(2).unwrap().parents(), &[0]);
    assert_eq!(highest_cost_path(&graph), 20);

    let mut widened = GraphBuilder::new(ConflictPolicy::new().with_storage_root_conflicts(true));
    let graph = reduce(&widened.build(&txs).unwrap());
    // 0 and 1 now conflict on the contract itself; 2 only reads slots
    assert_eq!(graph.node(1).unwrap().parents(), &[0]);
    assert_eq!(graph.node(2).unwrap().parents(), &[0]);
}

#[test]
fn hot_account_serializes_the_block() {
    // every transfer pays the same fee recipient
    let coinbase = addr(0xcb);
    let txs: Vec<_> = (0..10)
        .map(|i| TxTrace::new(i, 21_000).writes(coinbase).writes(addr(i as u8)))
        .collect();
    let block = BlockTrace::new(1, txs.clone());

    let serial = BlockAnalyzer::new(AnalysisConfig {
        lane_counts: vec![4],
        ..Default::default()
    })
    .analyze(&block)
    .unwrap();
    assert_eq!(serial.edges, 45);
    assert_eq!(serial.reduced_edges, 9);
    assert_eq!(serial.schedules[0].makespan, 210_000);

    let ignoring = BlockAnalyzer::new(AnalysisConfig {
        lane_counts: vec![4],
        policy: ConflictPolicy::new().ignore_address(coinbase),
        include_timeline: false,
    })
    .analyze(&block)
    .unwrap();
    assert_eq!(ignoring.edges, 0);
    assert_eq!(ignoring.critical_path, 21_000);
    assert_eq!(ignoring.schedules[0].makespan, 63_000);
}

#[test]
fn decoded_trace_end_to_end() {
    let json = r#"{
        "Block": 16026516,
        "Hash": "0x6d9a0b1f8c5e4f5a1a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d5e6f7081",
        "GasUsed": 350,
        "Txs": [
            {"Index": 0, "GasUsed": 100, "Writes": ["0x0101010101010101010101010101010101010101"]},
            {"Index": 1, "GasUsed": 200, "Writes": ["0x0202020202020202020202020202020202020202"], "Reads": null},
            {"Index": 2, "GasUsed": 50, "Reads": [
                "0x0101010101010101010101010101010101010101",
                "0x0202020202020202020202020202020202020202"
            ]}
        ]
    }"#;
    let block: BlockTrace = serde_json::from_str(json).unwrap();
    let report = BlockAnalyzer::new(AnalysisConfig {
        lane_counts: vec![1, 2],
        ..Default::default()
    })
    .analyze(&block)
    .unwrap();

    assert_eq!(report.block, 16026516);
    assert_eq!(report.gas_used, 350);
    assert_eq!(report.critical_path, 250);
    assert_eq!(report.schedule(1).unwrap().makespan, 350);
    assert_eq!(report.schedule(2).unwrap().makespan, 250);
}

#[test]
fn nested_accesses_create_edges() {
    let json = r#"{
        "Block": 1,
        "GasUsed": 300,
        "Txs": [
            {"Index": 0, "GasUsed": 100, "Accesses": {
                "Writes": ["0x0101010101010101010101010101010101010101"]
            }},
            {"Index": 1, "GasUsed": 200, "Accesses": {
                "Reads": ["0x0101010101010101010101010101010101010101"]
            }}
        ]
    }"#;
    let block: BlockTrace = serde_json::from_str(json).unwrap();
    let report = BlockAnalyzer::new(AnalysisConfig {
        lane_counts: vec![2],
        ..Default::default()
    })
    .analyze(&block)
    .unwrap();

    assert_eq!(report.edges, 1);
    assert_eq!(report.critical_path, 300);
    assert_eq!(report.schedule(2).unwrap().makespan, 300);
}

#[test]
fn zero_cost_transaction_on_one_lane() {
    let a = addr(1);
    let block = BlockTrace::new(
        1,
        vec![
            TxTrace::new(0, 0).writes(a),
            TxTrace::new(1, 5).reads(a),
            TxTrace::new(2, 5),
        ],
    );
    let report = BlockAnalyzer::new(AnalysisConfig {
        lane_counts: vec![1, 2],
        ..Default::default()
    })
    .analyze(&block)
    .unwrap();

    assert_eq!(report.schedule(1).unwrap().makespan, 10);
    assert_eq!(report.schedule(2).unwrap().makespan, 5);
}
