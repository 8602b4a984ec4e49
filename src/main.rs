// =============================================================================
// WASM クロンダイク - 開発・動作確認用メインエントリーポイント
// =============================================================================
// `cargo run` で実行するネイティブ版のデモです。
// ブラウザの代わりにマウスイベントを組み立てて卓に渡し、簡単な自動プレイで
// 押下・ドラッグ・ダブルクリック・ストックのクリックを一通り動かします。
//
// 用途：
// - 操作ステートマシンの動作確認
// - ゲームロジックのデバッグ
//
// 使い方：`main [シード]`
// =============================================================================

use klondike_wasm::logging;
use klondike_wasm::piles::{FOUNDATION_COUNT, TABLEAU_COUNT};
use klondike_wasm::{
    CardId, DropOutcome, GameConfig, GameSnapshot, ManualClock, PileId, PressOutcome, Table,
};

/// 自動プレイの最大手数
const MAX_ACTIONS: usize = 2_000;

/// 操作の間隔（ダブルクリック判定にかからない長さ）
const ACTION_GAP_MS: u64 = 1_000;

/// ダブルクリックの2回の押下の間隔
const DOUBLE_CLICK_GAP_MS: u64 = 80;

type DemoTable = Table<ManualClock>;

// =============================================================================
// 入力イベントの組み立て
// =============================================================================

/// カードの左上付近の座標（重なったカードでも見えている部分）
fn card_point(table: &DemoTable, card: CardId) -> (f32, f32) {
    let c = table.game().piles().card(card);
    (c.x + 5.0, c.y + 5.0)
}

/// カードをダブルクリックする。ファウンデーションへ移動できた場合 true
fn double_click(table: &mut DemoTable, card: CardId) -> bool {
    let (x, y) = card_point(table, card);
    table.clock().advance(ACTION_GAP_MS);
    table.pointer_press(x, y);
    table.pointer_release(x, y);
    table.clock().advance(DOUBLE_CLICK_GAP_MS);
    let outcome = table.pointer_press(x, y);
    table.pointer_release(x, y);
    matches!(outcome, PressOutcome::AutoMoved { .. })
}

/// カード（と上に重なる束）をタブロー列へドラッグする
fn drag_to_tableau(table: &mut DemoTable, card: CardId, column: usize) -> bool {
    let (x, y) = card_point(table, card);
    table.clock().advance(ACTION_GAP_MS);
    table.pointer_press(x, y);
    let slot = table.config().layout.tableau_slot(column);
    let (tx, ty) = (slot.x + 5.0, slot.y + 300.0);
    table.pointer_move(tx, ty);
    matches!(table.pointer_release(tx, ty), DropOutcome::ToTableau(_))
}

/// ストック枠をクリックする
fn click_stock(table: &mut DemoTable) -> PressOutcome {
    let rect = table.config().layout.stock_rect();
    table.clock().advance(ACTION_GAP_MS);
    let outcome = table.pointer_press(rect.x + 10.0, rect.y + 10.0);
    table.pointer_release(rect.x + 10.0, rect.y + 10.0);
    outcome
}

// =============================================================================
// 自動プレイ
// =============================================================================

/// ウェイストとタブローの一番上をダブルクリックしてファウンデーションへ送る
fn try_foundation(table: &mut DemoTable) -> bool {
    let piles = table.game().piles();
    let mut tops: Vec<CardId> = piles.top(PileId::Waste).into_iter().collect();
    tops.extend((0..TABLEAU_COUNT as u8).filter_map(|t| piles.top(PileId::Tableau(t))));

    for card in tops {
        let playable = (0..FOUNDATION_COUNT).any(|f| table.game().can_move_to_foundation(card, f));
        if playable && double_click(table, card) {
            return true;
        }
    }
    false
}

/// 裏向きカードをめくれる束の移動、またはウェイストからの移動を探す
fn try_tableau(table: &mut DemoTable) -> bool {
    let piles = table.game().piles();
    let mut candidates: Vec<CardId> = Vec::new();
    for t in 0..TABLEAU_COUNT {
        let start = piles.face_up_suffix_start(t);
        let pile = piles.pile(PileId::Tableau(t as u8));
        // 列の一番下からの移動は、めくれるカードがないので動かさない
        if start > 0 && start < pile.len() {
            candidates.push(pile[start]);
        }
    }
    candidates.extend(piles.top(PileId::Waste));

    for card in candidates {
        let target = (0..TABLEAU_COUNT).find(|t| table.game().can_move_to_tableau(card, *t));
        if let Some(column) = target {
            if drag_to_tableau(table, card, column) {
                return true;
            }
        }
    }
    false
}

/// 盤面の概要を表示
fn print_summary(snapshot: &GameSnapshot) {
    println!("📊 盤面:");
    println!("  ストック: {}枚, ウェイスト: {}枚", snapshot.stock.len(), snapshot.waste.len());
    let foundations: Vec<String> = snapshot
        .foundations
        .iter()
        .map(|f| f.last().map_or("--".to_string(), |c| c.label.clone()))
        .collect();
    println!("  ファウンデーション: [{}]", foundations.join(" "));
    for (i, pile) in snapshot.tableau.iter().enumerate() {
        let cards: Vec<String> = pile
            .iter()
            .map(|c| if c.face_up { c.label.clone() } else { "##".to_string() })
            .collect();
        println!("  タブロー{}: {}", i + 1, cards.join(" "));
    }
    println!(
        "  手数: {}, ドロー: {}, リサイクル: {}",
        snapshot.stats.move_count, snapshot.stats.draw_count, snapshot.stats.recycle_count
    );
}

// =============================================================================
// メイン関数
// =============================================================================

fn main() {
    if let Err(err) = logging::init(log::LevelFilter::Info) {
        eprintln!("ロガーの初期化に失敗しました: {}", err);
    }

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(2025);

    println!("🎮 WASM クロンダイク - 開発モード開始！（シード {}）", seed);
    println!("{}", "=".repeat(50));

    let mut table = Table::with_seed(seed, GameConfig::default(), ManualClock::new(0));
    print_summary(&table.snapshot());

    let mut moved_since_recycle = true;
    for _ in 0..MAX_ACTIONS {
        if table.game().is_won() {
            break;
        }
        if try_foundation(&mut table) || try_tableau(&mut table) {
            moved_since_recycle = true;
            continue;
        }
        match click_stock(&mut table) {
            PressOutcome::Recycled => {
                if !moved_since_recycle {
                    println!("🤔 これ以上進められる手が見つかりません");
                    break;
                }
                moved_since_recycle = false;
            }
            PressOutcome::Drew => {}
            _ => break,
        }
    }

    println!("\n--- 最終状態 ---");
    print_summary(&table.snapshot());
    if table.game().is_won() {
        println!("🎉 おめでとうございます！クリアしました！");
    }

    if let Err(err) = table.game().piles().check_invariants() {
        eprintln!("❌ 盤面の整合性エラー: {}", err);
        std::process::exit(1);
    }
    println!("{}", "=".repeat(50));
}
