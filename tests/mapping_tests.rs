use sovran_mapper::{Mappable, Mapper, MapperConfig, MapperError};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::thread;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, Default, PartialEq, Mappable)]
struct ProductDataModel {
    pub id: String,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Mappable)]
struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
}

#[test]
fn test_product_data_model_to_product() {
    init_logging();
    let mapper = Mapper::new();
    mapper
        .create_map::<Option<ProductDataModel>, Option<Product>>()
        .unwrap();

    let model = ProductDataModel {
        id: "p1".to_string(),
        name: "Widget".to_string(),
        price: 9.99,
    };
    let product: Product = mapper.map(&model).unwrap();
    assert_eq!(product.id, "p1");
    assert_eq!(product.name, "Widget");
    assert_eq!(product.price, 9.99);

    let wrapped: Option<Product> = mapper.map(&Some(model)).unwrap();
    assert_eq!(wrapped, Some(product));
}

#[test]
fn test_zero_source_yields_zero_destination() {
    let mapper = Mapper::new();
    mapper
        .create_map::<Option<ProductDataModel>, Option<Product>>()
        .unwrap();

    let none: Option<Product> = mapper.map(&None::<ProductDataModel>).unwrap();
    assert!(none.is_none());

    let empty: Product = mapper.map(&ProductDataModel::default()).unwrap();
    assert_eq!(empty, Product::default());

    let no_rows: Vec<Product> = mapper.map(&Vec::<ProductDataModel>::new()).unwrap();
    assert!(no_rows.is_empty());
}

#[test]
fn test_unregistered_pair_fails_closed() {
    let mapper = Mapper::new();
    let model = ProductDataModel {
        id: "p1".to_string(),
        ..Default::default()
    };

    let err = mapper.map::<Product, _>(&model).unwrap_err();
    match err {
        MapperError::MapNotExist {
            source_type,
            dest_type,
        } => {
            assert!(source_type.ends_with("ProductDataModel"));
            assert!(dest_type.ends_with("Product"));
        }
        other => panic!("expected MapNotExist, got {other:?}"),
    }
}

#[test]
fn test_sequences_use_element_registration() {
    let mapper = Mapper::new();
    mapper.create_map::<ProductDataModel, Product>().unwrap();

    let rows = vec![
        ProductDataModel {
            id: "a".to_string(),
            name: "Anvil".to_string(),
            price: 10.0,
        },
        ProductDataModel {
            id: "b".to_string(),
            name: "Bolt".to_string(),
            price: 0.25,
        },
    ];
    let products: Vec<Product> = mapper.map(&rows).unwrap();
    let ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(products[1].price, 0.25);
}

#[cfg(feature = "chrono")]
mod timestamps {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    #[derive(Debug, Default, Mappable)]
    struct Order {
        pub order_id: String,
        pub placed_at: DateTime<Utc>,
    }

    #[derive(Debug, Default, PartialEq, Mappable)]
    struct Timestamp {
        pub seconds: i64,
        pub nanos: u32,
    }

    #[allow(non_snake_case)]
    #[derive(Debug, Default, Mappable)]
    struct OrderDto {
        pub orderId: String,
        pub placed_at: Timestamp,
    }

    #[test]
    fn test_custom_timestamp_inside_structural_map() {
        init_logging();
        let mapper = Mapper::new();
        mapper.create_map::<Order, OrderDto>().unwrap();
        mapper
            .create_custom_map(|at: &DateTime<Utc>| {
                Ok::<_, MapperError>(Timestamp {
                    seconds: at.timestamp(),
                    nanos: at.timestamp_subsec_nanos(),
                })
            })
            .unwrap();

        let placed_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let order = Order {
            order_id: "o-17".to_string(),
            placed_at,
        };
        let dto: OrderDto = mapper.map(&order).unwrap();

        assert_eq!(dto.orderId, "o-17");
        assert_eq!(
            dto.placed_at,
            Timestamp {
                seconds: placed_at.timestamp(),
                nanos: 0,
            }
        );
    }
}

#[test]
fn test_custom_function_is_applied_per_element() {
    let mapper = Mapper::new();
    mapper
        .create_custom_map(|row: &ProductDataModel| {
            Ok::<_, MapperError>(Product {
                id: row.id.to_uppercase(),
                name: row.name.clone(),
                price: row.price * 2.0,
            })
        })
        .unwrap();

    let rows = vec![
        ProductDataModel {
            id: "x".to_string(),
            name: "X".to_string(),
            price: 1.0,
        },
        ProductDataModel {
            id: "y".to_string(),
            name: "Y".to_string(),
            price: 2.5,
        },
    ];
    let products: Vec<Product> = mapper.map(&rows).unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, "X");
    assert_eq!(products[1].price, 5.0);
}

#[derive(Debug)]
struct PriceError(String);

impl fmt::Display for PriceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid price for {}", self.0)
    }
}

impl std::error::Error for PriceError {}

#[test]
fn test_custom_function_error_is_returned_unchanged() {
    let mapper = Mapper::new();
    mapper
        .create_custom_map(|row: &ProductDataModel| {
            if row.price < 0.0 {
                return Err(PriceError(row.id.clone()));
            }
            Ok(Product::default())
        })
        .unwrap();

    let bad = ProductDataModel {
        id: "neg".to_string(),
        name: String::new(),
        price: -1.0,
    };
    let err = mapper.map::<Product, _>(&bad).unwrap_err();
    assert_eq!(err.to_string(), "invalid price for neg");
    match err {
        MapperError::Custom(inner) => assert!(inner.downcast_ref::<PriceError>().is_some()),
        other => panic!("expected custom error, got {other:?}"),
    }

    let err = mapper.map::<Vec<Product>, _>(&vec![bad]).unwrap_err();
    assert_eq!(err.to_string(), "invalid price for neg");
}

#[derive(Debug, Default, Mappable)]
struct Tagged {
    #[mapper(tag = "bar")]
    pub foo: String,
    #[mapper(tag = "identifier")]
    pub code: u32,
}

#[derive(Debug, Default, Mappable)]
struct TagTarget {
    pub bar: String,
    pub other: u32,
    #[mapper(tag = "identifier")]
    pub key: u32,
}

#[test]
fn test_tag_correspondence() {
    let mapper = Mapper::new();
    mapper.create_map::<Tagged, TagTarget>().unwrap();

    let target: TagTarget = mapper
        .map(&Tagged {
            foo: "hello".to_string(),
            code: 42,
        })
        .unwrap();
    assert_eq!(target.bar, "hello");
    assert_eq!(target.key, 42);
    assert_eq!(target.other, 0);
}

#[derive(Debug, Default, Mappable)]
struct Account {
    pub id: String,
    secret: String,
}

#[derive(Debug, Default, Mappable)]
struct AccountDto {
    pub id: String,
    pub secret: String,
}

#[derive(Debug, Default, Mappable)]
struct AccountRecord {
    pub id: String,
    secret: String,
}

#[test]
fn test_private_fields_follow_config() {
    let account = Account {
        id: "acc".to_string(),
        secret: "hunter2".to_string(),
    };

    let mapper = Mapper::new();
    mapper.create_map::<Account, AccountDto>().unwrap();
    mapper.create_map::<AccountDto, AccountRecord>().unwrap();
    let dto: AccountDto = mapper.map(&account).unwrap();
    assert_eq!(dto.id, "acc");
    assert_eq!(dto.secret, "");

    let exposed = AccountDto {
        id: "acc".to_string(),
        secret: "hunter2".to_string(),
    };
    let record: AccountRecord = mapper.map(&exposed).unwrap();
    assert_eq!(record.secret, "");

    let permissive =
        Mapper::with_config(MapperConfig::default().with_unexported_fields(true));
    permissive.create_map::<Account, AccountDto>().unwrap();
    permissive.create_map::<AccountDto, AccountRecord>().unwrap();
    let dto: AccountDto = permissive.map(&account).unwrap();
    assert_eq!(dto.secret, "hunter2");
    let record: AccountRecord = permissive.map(&exposed).unwrap();
    assert_eq!(record.secret, "hunter2");
}

#[derive(Debug, Default, Mappable)]
#[mapper(methods(balance, display_name))]
struct Wallet {
    pub owner: String,
    balance: i64,
}

impl Wallet {
    fn balance(&self) -> i64 {
        self.balance
    }

    fn display_name(&self) -> String {
        format!("{}'s wallet", self.owner)
    }
}

#[derive(Debug, Default, Mappable)]
struct WalletDto {
    pub owner: String,
    pub balance: i64,
    pub display_name: String,
}

#[test]
fn test_methods_supply_values() {
    let mapper = Mapper::new();
    mapper.create_map::<Wallet, WalletDto>().unwrap();

    let wallet = Wallet {
        owner: "ada".to_string(),
        balance: 120,
    };
    let dto: WalletDto = mapper.map(&wallet).unwrap();
    assert_eq!(dto.owner, "ada");
    assert_eq!(dto.balance, 120);
    assert_eq!(dto.display_name, "ada's wallet");
}

#[derive(Debug, Default, Mappable)]
struct Node {
    pub value: i32,
    pub next: Option<Box<Node>>,
}

#[derive(Debug, Default, PartialEq, Mappable)]
struct NodeDto {
    pub value: i32,
    pub next: Option<Box<NodeDto>>,
}

#[test]
fn test_nested_pointers() {
    let mapper = Mapper::new();
    mapper.create_map::<Node, NodeDto>().unwrap();

    let list = Node {
        value: 1,
        next: Some(Box::new(Node {
            value: 2,
            next: Some(Box::new(Node {
                value: 3,
                next: None,
            })),
        })),
    };
    let dto: NodeDto = mapper.map(&list).unwrap();

    let mut values = Vec::new();
    let mut cursor = Some(&dto);
    while let Some(node) = cursor {
        values.push(node.value);
        cursor = node.next.as_deref();
    }
    assert_eq!(values, vec![1, 2, 3]);
}

#[derive(Debug, Default, Mappable)]
struct Draft {
    pub amount: Option<i64>,
    pub note: String,
}

#[derive(Debug, Default, Mappable)]
struct Posted {
    pub amount: i64,
    pub note: Option<String>,
}

#[test]
fn test_pointer_and_value_sides_mix() {
    let mapper = Mapper::new();
    mapper.create_map::<Draft, Posted>().unwrap();

    let posted: Posted = mapper
        .map(&Draft {
            amount: Some(250),
            note: "rent".to_string(),
        })
        .unwrap();
    assert_eq!(posted.amount, 250);
    assert_eq!(posted.note.as_deref(), Some("rent"));

    let posted: Posted = mapper
        .map(&Draft {
            amount: None,
            note: "pending".to_string(),
        })
        .unwrap();
    assert_eq!(posted.amount, 0);
}

#[derive(Debug, Default, Mappable)]
struct Stock {
    pub by_sku: HashMap<String, ProductDataModel>,
    pub shelves: BTreeMap<u32, Vec<String>>,
}

#[derive(Debug, Default, Mappable)]
struct StockDto {
    pub by_sku: HashMap<String, Product>,
    pub shelves: BTreeMap<u32, Vec<String>>,
}

#[test]
fn test_maps_are_converted_entry_by_entry() {
    let mapper = Mapper::new();
    mapper.create_map::<Stock, StockDto>().unwrap();
    mapper.create_map::<ProductDataModel, Product>().unwrap();

    let mut by_sku = HashMap::new();
    by_sku.insert(
        "w-1".to_string(),
        ProductDataModel {
            id: "w-1".to_string(),
            name: "Widget".to_string(),
            price: 3.5,
        },
    );
    let mut shelves = BTreeMap::new();
    shelves.insert(4, vec!["w-1".to_string()]);

    let dto: StockDto = mapper.map(&Stock { by_sku, shelves }).unwrap();
    assert_eq!(dto.by_sku["w-1"].name, "Widget");
    assert_eq!(dto.shelves[&4], vec!["w-1".to_string()]);
}

#[derive(Default, Mappable)]
struct Envelope {
    pub kind: String,
    pub payload: Box<dyn Mappable>,
}

#[derive(Debug, Default, Mappable)]
struct EnvelopeDto {
    pub kind: String,
    pub payload: String,
}

#[test]
fn test_interface_values_are_unwrapped() {
    let mapper = Mapper::new();
    mapper.create_map::<Envelope, EnvelopeDto>().unwrap();

    let dto: EnvelopeDto = mapper
        .map(&Envelope {
            kind: "note".to_string(),
            payload: Box::new("hello".to_string()),
        })
        .unwrap();
    assert_eq!(dto.kind, "note");
    assert_eq!(dto.payload, "hello");
}

#[derive(Default, Mappable)]
struct EnvelopeCopy {
    pub kind: String,
    pub payload: Box<dyn Mappable>,
}

#[derive(Debug, Clone, Default, PartialEq, Mappable)]
struct Note {
    pub text: String,
    pub pinned: bool,
}

#[test]
fn test_interface_destination_keeps_concrete_value() {
    init_logging();
    let mapper = Mapper::new();
    mapper.create_map::<Envelope, EnvelopeCopy>().unwrap();

    let copy: EnvelopeCopy = mapper
        .map(&Envelope {
            kind: "note".to_string(),
            payload: Box::new("hello".to_string()),
        })
        .unwrap();
    assert_eq!(copy.kind, "note");
    assert_eq!(
        (*copy.payload).as_any().downcast_ref::<String>(),
        Some(&"hello".to_string())
    );

    let note = Note {
        text: "ship friday".to_string(),
        pinned: true,
    };
    let copy: EnvelopeCopy = mapper
        .map(&Envelope {
            kind: "pinned".to_string(),
            payload: Box::new(note.clone()),
        })
        .unwrap();
    assert_eq!((*copy.payload).as_any().downcast_ref::<Note>(), Some(&note));
}

#[test]
fn test_plain_field_into_interface_field() {
    let mapper = Mapper::new();
    mapper.create_map::<EnvelopeDto, Envelope>().unwrap();

    let envelope: Envelope = mapper
        .map(&EnvelopeDto {
            kind: "note".to_string(),
            payload: "from dto".to_string(),
        })
        .unwrap();
    assert_eq!(
        (*envelope.payload).as_any().downcast_ref::<String>(),
        Some(&"from dto".to_string())
    );
}

#[derive(Debug, Default, Mappable)]
#[mapper(methods(note_text))]
struct Annotated {
    pub id: u32,
    #[mapper(skip)]
    note: String,
}

impl Annotated {
    fn note_text(&self) -> String {
        self.note.clone()
    }
}

#[derive(Debug, Default, Mappable)]
struct AnnotatedDto {
    pub id: u32,
    pub note_text: String,
}

#[test]
fn test_skipped_fields_count_towards_zero() {
    let mapper = Mapper::new();
    mapper.create_map::<Annotated, AnnotatedDto>().unwrap();

    assert!(Annotated::default().is_zero());
    let only_note = Annotated {
        id: 0,
        note: "check stock".to_string(),
    };
    assert!(!only_note.is_zero());

    let dto: AnnotatedDto = mapper.map(&only_note).unwrap();
    assert_eq!(dto.id, 0);
    assert_eq!(dto.note_text, "check stock");
}

#[derive(Debug, Default, Mappable)]
struct Reading {
    pub celsius: Option<i32>,
    pub label: Option<String>,
}

#[derive(Debug, Default, Mappable)]
struct ReadingDto {
    pub celsius: Box<i32>,
    pub label: Option<String>,
}

#[test]
fn test_null_into_boxed_and_optional_fields() {
    let mapper = Mapper::new();
    mapper.create_map::<Reading, ReadingDto>().unwrap();

    let dto: ReadingDto = mapper
        .map(&Reading {
            celsius: None,
            label: Some("north wall".to_string()),
        })
        .unwrap();
    assert_eq!(*dto.celsius, 0);
    assert_eq!(dto.label.as_deref(), Some("north wall"));

    let dto: ReadingDto = mapper
        .map(&Reading {
            celsius: Some(21),
            label: None,
        })
        .unwrap();
    assert_eq!(*dto.celsius, 21);
    assert!(dto.label.is_none());
}

#[derive(Debug, Default, Mappable)]
struct Line {
    pub amount: u64,
}

#[derive(Debug, Default, Mappable)]
struct Ledger {
    pub lines: Vec<Line>,
    pub totals: Vec<u64>,
}

#[derive(Debug, Default, Mappable)]
struct LedgerDto {
    pub lines: Vec<LineDto>,
    pub totals: u64,
}

#[derive(Debug, Default, Mappable)]
struct LineDto {
    pub amount: u64,
}

#[test]
fn test_lenient_mode_leaves_mismatches_unset() {
    init_logging();
    let mapper = Mapper::new();
    mapper.create_map::<Ledger, LedgerDto>().unwrap();

    let ledger = Ledger {
        lines: vec![Line { amount: 5 }],
        totals: vec![5],
    };
    let dto: LedgerDto = mapper.map(&ledger).unwrap();
    assert_eq!(dto.totals, 0);
    assert_eq!(dto.lines.len(), 1);
    assert_eq!(dto.lines[0].amount, 0);
}

#[test]
fn test_strict_mode_reports_mismatches() {
    let mapper = Mapper::with_config(MapperConfig::new().with_strict(true));
    mapper.create_map::<Ledger, LedgerDto>().unwrap();

    let ledger = Ledger {
        lines: vec![Line { amount: 5 }],
        totals: vec![5],
    };
    match mapper.map::<LedgerDto, _>(&ledger).unwrap_err() {
        MapperError::ProfileNotFound(name) => assert_eq!(name, "Line_LineDto"),
        other => panic!("expected ProfileNotFound, got {other:?}"),
    }

    mapper.create_map::<Line, LineDto>().unwrap();
    match mapper.map::<LedgerDto, _>(&ledger).unwrap_err() {
        MapperError::StructuralMismatch { path, .. } => assert_eq!(path, "Ledger.totals"),
        other => panic!("expected StructuralMismatch, got {other:?}"),
    }
}

#[test]
fn test_collection_mismatch_at_top_level() {
    let row = ProductDataModel {
        id: "p".to_string(),
        ..Default::default()
    };

    let lenient = Mapper::new();
    lenient.create_map::<ProductDataModel, Product>().unwrap();
    let products: Vec<Product> = lenient.map(&row).unwrap();
    assert!(products.is_empty());

    let strict = Mapper::with_config(MapperConfig::new().with_strict(true));
    strict.create_map::<ProductDataModel, Product>().unwrap();
    let err = strict.map::<Vec<Product>, _>(&row).unwrap_err();
    assert!(matches!(err, MapperError::StructuralMismatch { .. }));
}

#[test]
fn test_concurrent_mapping_on_frozen_mapper() {
    let mapper = Arc::new(Mapper::new());
    mapper.create_map::<ProductDataModel, Product>().unwrap();
    mapper.freeze().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let mapper = Arc::clone(&mapper);
            thread::spawn(move || {
                for j in 0..50 {
                    let row = ProductDataModel {
                        id: format!("{i}-{j}"),
                        name: "n".to_string(),
                        price: j as f64,
                    };
                    let product: Product = mapper.map(&row).unwrap();
                    assert_eq!(product.id, row.id);
                    assert_eq!(product.price, row.price);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
