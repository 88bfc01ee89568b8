//! Terminal implementation of the renderer contract

use comfy_table::{Table, presets::UTF8_FULL};
use tracing::debug;
use valuation_client::format::{DASH, stock_metrics};
use valuation_client::{RenderInstruction, Renderer, StockSummary, ValuationFields};

const BAR_WIDTH: usize = 20;

/// Prints render instructions to stdout/stderr
#[derive(Debug, Default)]
pub struct TerminalRenderer;

impl TerminalRenderer {
    fn results_table(items: &[StockSummary]) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["市场", "代码", "名称", "指标"]);
        for stock in items {
            table.add_row(vec![
                stock.market.label().to_string(),
                stock.code.clone(),
                stock.name.clone(),
                stock_metrics(stock),
            ]);
        }
        table
    }

    fn valuation_table(fields: &ValuationFields) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["企业价值", "股权价值", "每股价值", "PE", "PB", "EV/FCF"]);
        table.add_row(vec![
            fields.enterprise_value.clone(),
            fields.equity_value.clone(),
            fields.per_share_value.clone(),
            fields.pe_ratio.clone(),
            fields.pb_ratio.clone(),
            fields.ev_fcf_ratio.clone(),
        ]);
        table
    }

    fn progress_bar(percent: u8) -> String {
        let filled = usize::from(percent) * BAR_WIDTH / 100;
        format!("[{}{}]", "=".repeat(filled), " ".repeat(BAR_WIDTH - filled))
    }
}

impl Renderer for TerminalRenderer {
    fn render(&self, instruction: RenderInstruction) {
        match instruction {
            RenderInstruction::ReplaceResults { items, total } => {
                if total > items.len() as u64 {
                    println!("找到 {total} 个结果，显示前 {} 条", items.len());
                }
                println!("{}", Self::results_table(&items));
            }
            RenderInstruction::AppendResults { items, .. } => {
                println!("{}", Self::results_table(&items));
            }
            RenderInstruction::ShowEmpty => println!("未找到匹配的股票"),
            RenderInstruction::ShowSearchError => println!("搜索失败，请稍后重试"),
            RenderInstruction::SetLoadMore(true) => println!("输入 /more 加载更多"),
            RenderInstruction::SetValuation(fields) => {
                println!("{}", Self::valuation_table(&fields));
            }
            RenderInstruction::MarkValuationError => {
                println!("企业价值: 分析失败 | 股权价值: 分析失败 | 每股价值: 分析失败");
            }
            RenderInstruction::ClearValuation => debug!("Valuation reset to {}", DASH),
            // A terminal cannot retract a line, so the banner lifetime is not applied.
            RenderInstruction::ShowTransientError { message, .. } => eprintln!("错误: {message}"),
            RenderInstruction::ShowWarning(message) => eprintln!("{message}"),
            RenderInstruction::ShowInputError { message, .. } => eprintln!("输入错误: {message}"),
            RenderInstruction::ShowParamValue { field, display } => println!("{field}: {display}"),
            RenderInstruction::Progress { state, .. } if state.visible => {
                eprintln!(
                    "{} {:>3}% {}",
                    Self::progress_bar(state.percent),
                    state.percent,
                    state.message
                );
            }
            other => debug!("Unrendered instruction: {:?}", other),
        }
    }
}
