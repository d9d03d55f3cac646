pub mod core;
pub mod storage;
pub mod analysis;
pub mod index;
pub mod query;
pub mod search;
pub mod average;
pub mod batch;
pub mod writer;
pub mod api;
pub mod logging;

/*
┌──────────────────────────────────── ANTHOLOGY LAYOUT ─────────────────────────────────────┐
│                                                                                            │
│   HTTP (api)                          CLI (main.rs)                                        │
│   GET  /songs, /songs/search ──┐      serve │ import <file> │ aggregate                    │
│   GET  /songs/avg ─────────────┼──┐           │                 │                          │
│   GET/POST /songs/rating/{id} ─┼──┼──┐        │                 │                          │
│                                │  │  │        ▼                 ▼                          │
│   ┌────────────────────┐  ┌────┴──┴──┴──┐  writer::import   batch::AggregationJob         │
│   │ search::KeysetPager│◄─┘  │  │        │  SongImporter     LevelScheduler (rayon)        │
│   │ • SongFilter       │     │  │        │                   SongsData                     │
│   │ • continuation_uri │     │  │        │                     └► SongsByLevel             │
│   └─────────┬──────────┘     │  │        │                          └► CalculateTotal...   │
│             │  ┌─────────────┘  │        │                                   │             │
│             │  │ average::AverageEngine  │                                   │             │
│             │  │  trivial ──────┐  fun ──┼───────────────┐                   │             │
│             ▼  ▼                ▼        ▼               ▼                   ▼             │
│   ┌──────────────────────────────────────────┐   ┌───────────────────────────────────┐    │
│   │ trait RecordStore                        │   │ trait AggregateStore              │    │
│   │   SongCollection                         │   │   LevelTotals                     │    │
│   │   • BTreeMap<SongId, Document>           │   │   • BTreeMap<level, Aggregate...> │    │
│   │   • TextIndex (analysis + index)         │   │   • WAL<TotalsOp>                 │    │
│   │   • QueryPlanner / DocumentMatcher       │   └───────────────────────────────────┘    │
│   │   • Pipeline [Match?, Group(avg)]        │                                            │
│   │   • WAL<Operation>                       │                                            │
│   └──────────────────────────────────────────┘                                            │
└────────────────────────────────────────────────────────────────────────────────────────────┘
*/
