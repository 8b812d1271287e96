//! 集成测试共用的假下单网站
//!
//! `FakeOrderSite` 按照真实页面的行为响应 `PageDriver` 调用：
//! 弹窗遮挡时其他控件不可操作，提交可以被脚本化地拒绝若干次。
#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

use robot_order_receipts::error::{AppError, AppResult};
use robot_order_receipts::models::{load_orders_csv, BoundingBox, OrderRecord, Selectors};
use robot_order_receipts::services::OrderSource;
use robot_order_receipts::{Config, PageDriver};

pub const ORDER_PAGE_URL: &str = "https://robots.test/#/robot-order";

/// 预览图在页面中的位置
pub const PREVIEW_BOX: BoundingBox = BoundingBox {
    x: 12.5,
    y: 40.25,
    width: 300.0,
    height: 417.75,
};

pub const ORDERS_CSV: &str = "\
Order number,Head,Body,Legs,Address
1,1,2,3,Address 1
2,4,5,6,Address 2
3,2,1,4,Address 3
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Blank,
    Form,
    Receipt,
}

#[derive(Debug)]
struct SiteState {
    view: View,
    modal_open: bool,
    /// 每次表单出现时是否弹窗，用完后取 `modal_default`
    modal_plan: VecDeque<bool>,
    modal_default: bool,
    fields: HashMap<String, String>,
    alert: bool,
    /// 按地址计数的剩余拒绝次数，`u32::MAX` 表示永远拒绝
    rejections: HashMap<String, u32>,
    submit_clicks: HashMap<String, u32>,
    next_order: u32,
    /// 按顺序覆盖生成的订单号
    id_overrides: VecDeque<String>,
    current_id: Option<String>,
    /// 第 N 次下单成功时模拟浏览器断开
    disconnect_on_order: Option<u32>,
    clips: Vec<BoundingBox>,
    missing: HashSet<String>,
    gotos: u32,
    /// 页面跳转或提交后，每个选择器的 `is_visible` 继续看到旧页面的次数
    render_lag: u32,
    lag_remaining: HashMap<String, u32>,
    shown: Shown,
}

/// `is_visible` 看到的页面状态
#[derive(Debug, Clone, Copy)]
struct Shown {
    view: View,
    modal_open: bool,
    alert: bool,
}

impl SiteState {
    fn snapshot(&self) -> Shown {
        Shown {
            view: self.view,
            modal_open: self.modal_open,
            alert: self.alert,
        }
    }

    /// 页面状态即将变化，记下旧状态供延迟渲染使用
    fn begin_transition(&mut self) {
        self.shown = self.snapshot();
        self.lag_remaining.clear();
    }

    fn visible_state(&mut self, selector: &str) -> Shown {
        let lag = self.render_lag;
        let remaining = self
            .lag_remaining
            .entry(selector.to_string())
            .or_insert(lag);
        if *remaining > 0 {
            *remaining -= 1;
            self.shown
        } else {
            self.snapshot()
        }
    }
}

pub struct FakeOrderSite {
    selectors: Selectors,
    state: Mutex<SiteState>,
}

impl FakeOrderSite {
    pub fn new() -> Self {
        Self {
            selectors: Selectors::default(),
            state: Mutex::new(SiteState {
                view: View::Blank,
                modal_open: false,
                modal_plan: VecDeque::new(),
                modal_default: true,
                fields: HashMap::new(),
                alert: false,
                rejections: HashMap::new(),
                submit_clicks: HashMap::new(),
                next_order: 0,
                id_overrides: VecDeque::new(),
                current_id: None,
                disconnect_on_order: None,
                clips: Vec::new(),
                missing: HashSet::new(),
                gotos: 0,
                render_lag: 0,
                lag_remaining: HashMap::new(),
                shown: Shown {
                    view: View::Blank,
                    modal_open: false,
                    alert: false,
                },
            }),
        }
    }

    /// 依次决定每次表单出现时是否弹窗
    pub fn with_modal_plan(self, plan: &[bool], default: bool) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.modal_plan = plan.iter().copied().collect();
            state.modal_default = default;
        }
        self
    }

    /// 该地址的订单前 `times` 次提交被拒绝
    pub fn reject(self, address: &str, times: u32) -> Self {
        self.state
            .lock()
            .unwrap()
            .rejections
            .insert(address.to_string(), times);
        self
    }

    pub fn with_ids(self, ids: &[&str]) -> Self {
        self.state.lock().unwrap().id_overrides = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn disconnect_on_order(self, n: u32) -> Self {
        self.state.lock().unwrap().disconnect_on_order = Some(n);
        self
    }

    /// 页面上不存在该选择器对应的元素
    pub fn without(self, selector: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .missing
            .insert(selector.to_string());
        self
    }

    /// 每次跳转或提交后，每个选择器的前 `polls` 次可见性检查仍看到旧页面
    pub fn with_render_lag(self, polls: u32) -> Self {
        self.state.lock().unwrap().render_lag = polls;
        self
    }

    pub fn clips(&self) -> Vec<BoundingBox> {
        self.state.lock().unwrap().clips.clone()
    }

    pub fn submit_clicks(&self, address: &str) -> u32 {
        self.state
            .lock()
            .unwrap()
            .submit_clicks
            .get(address)
            .copied()
            .unwrap_or(0)
    }

    pub fn gotos(&self) -> u32 {
        self.state.lock().unwrap().gotos
    }

    pub fn modal_open(&self) -> bool {
        self.state.lock().unwrap().modal_open
    }

    fn missing(&self, selector: &str, detail: &str) -> AppError {
        AppError::missing_control(selector, detail)
    }

    /// 表单控件可操作的前提：表单已显示且没有弹窗遮挡
    fn form_control(&self, state: &SiteState, selector: &str) -> AppResult<()> {
        if state.missing.contains(selector) || state.view != View::Form {
            return Err(self.missing(selector, "元素不存在"));
        }
        if state.modal_open {
            return Err(self.missing(selector, "被弹窗遮挡"));
        }
        Ok(())
    }

    fn show_form(state: &mut SiteState) {
        state.view = View::Form;
        state.fields.clear();
        state.alert = false;
        state.current_id = None;
        let default = state.modal_default;
        state.modal_open = state.modal_plan.pop_front().unwrap_or(default);
    }

    fn submit(&self, state: &mut SiteState) -> AppResult<()> {
        let address = state
            .fields
            .get(&self.selectors.address_input)
            .cloned()
            .unwrap_or_default();
        *state.submit_clicks.entry(address.clone()).or_insert(0) += 1;

        let complete = [
            self.selectors.head_select.as_str(),
            self.selectors.legs_input.as_str(),
            self.selectors.address_input.as_str(),
            "body",
        ]
        .iter()
        .all(|key| state.fields.contains_key(*key));

        let rejected = match state.rejections.get_mut(&address) {
            Some(remaining) if *remaining > 0 => {
                if *remaining != u32::MAX {
                    *remaining -= 1;
                }
                true
            }
            _ => false,
        };

        if rejected || !complete || !state.fields.contains_key("preview") {
            state.alert = true;
            return Ok(());
        }

        state.next_order += 1;
        if state.disconnect_on_order == Some(state.next_order) {
            return Err(AppError::Browser("websocket connection closed".to_string()));
        }
        let id = state
            .id_overrides
            .pop_front()
            .unwrap_or_else(|| format!("RSB-ROBO-ORDER-{:03}", state.next_order));
        state.current_id = Some(id);
        state.alert = false;
        state.view = View::Receipt;
        Ok(())
    }
}

#[async_trait]
impl PageDriver for FakeOrderSite {
    async fn goto(&self, _url: &str) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.gotos += 1;
        state.begin_transition();
        Self::show_form(&mut state);
        Ok(())
    }

    async fn select_option(&self, selector: &str, value: &str) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        self.form_control(&state, selector)?;
        state.fields.insert(selector.to_string(), value.to_string());
        Ok(())
    }

    async fn check(&self, selector: &str) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        self.form_control(&state, selector)?;
        state.fields.insert("body".to_string(), selector.to_string());
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        self.form_control(&state, selector)?;
        state.fields.insert(selector.to_string(), value.to_string());
        Ok(())
    }

    async fn click(&self, selector: &str) -> AppResult<()> {
        let s = &self.selectors;
        let mut state = self.state.lock().unwrap();
        if state.missing.contains(selector) {
            return Err(self.missing(selector, "元素不存在"));
        }

        if selector == s.modal_dismiss {
            if state.view != View::Form || !state.modal_open {
                return Err(self.missing(selector, "没有弹窗"));
            }
            state.modal_open = false;
        } else if selector == s.preview_button {
            self.form_control(&state, selector)?;
            state.fields.insert("preview".to_string(), String::new());
        } else if selector == s.submit_button {
            self.form_control(&state, selector)?;
            state.begin_transition();
            self.submit(&mut state)?;
        } else if selector == s.order_another_button {
            if state.view != View::Receipt {
                return Err(self.missing(selector, "不在确认页"));
            }
            state.begin_transition();
            Self::show_form(&mut state);
        } else {
            return Err(self.missing(selector, "未知控件"));
        }
        Ok(())
    }

    async fn is_visible(&self, selector: &str) -> AppResult<bool> {
        let s = &self.selectors;
        let mut state = self.state.lock().unwrap();
        if state.missing.contains(selector) {
            return Ok(false);
        }
        let shown = state.visible_state(selector);
        let visible = if selector == s.modal_dismiss {
            shown.view == View::Form && shown.modal_open
        } else if selector == s.head_select {
            shown.view == View::Form
        } else if selector == s.validation_alert {
            shown.view == View::Form && shown.alert
        } else if selector == s.receipt || selector == s.preview_image {
            shown.view == View::Receipt
        } else {
            false
        };
        Ok(visible)
    }

    async fn text_content(&self, selector: &str) -> AppResult<String> {
        let state = self.state.lock().unwrap();
        match (&state.current_id, selector == self.selectors.order_id) {
            (Some(id), true) if state.view == View::Receipt => Ok(format!("  {}\n", id)),
            _ => Err(self.missing(selector, "元素不存在")),
        }
    }

    async fn inner_html(&self, selector: &str) -> AppResult<String> {
        let state = self.state.lock().unwrap();
        match (&state.current_id, selector == self.selectors.receipt) {
            (Some(id), true) if state.view == View::Receipt => Ok(format!(
                "<p class=\"badge\">{}</p><p>{}</p>",
                id,
                state
                    .fields
                    .get(&self.selectors.address_input)
                    .cloned()
                    .unwrap_or_default()
            )),
            _ => Err(self.missing(selector, "元素不存在")),
        }
    }

    async fn bounding_box(&self, selector: &str) -> AppResult<BoundingBox> {
        let state = self.state.lock().unwrap();
        if state.view == View::Receipt && selector == self.selectors.preview_image {
            Ok(PREVIEW_BOX)
        } else {
            Err(self.missing(selector, "元素不存在"))
        }
    }

    async fn screenshot_clip(&self, clip: BoundingBox) -> AppResult<Vec<u8>> {
        self.state.lock().unwrap().clips.push(clip);
        Ok(png_bytes(clip.width as u32 / 10, clip.height as u32 / 10))
    }

    async fn render_pdf(&self, _html: &str) -> AppResult<Vec<u8>> {
        Ok(single_page_pdf())
    }
}

/// 把固定 CSV 写到本地的数据源
pub struct StaticOrderSource {
    csv: String,
    local_path: PathBuf,
}

impl StaticOrderSource {
    pub fn new(csv: &str, local_path: impl Into<PathBuf>) -> Self {
        Self {
            csv: csv.to_string(),
            local_path: local_path.into(),
        }
    }
}

#[async_trait]
impl OrderSource for StaticOrderSource {
    async fn fetch(&self) -> AppResult<PathBuf> {
        std::fs::write(&self.local_path, &self.csv)
            .map_err(|e| AppError::write_failed(&self.local_path, e))?;
        Ok(self.local_path.clone())
    }

    fn parse(&self, file: &Path) -> AppResult<Vec<AppResult<OrderRecord>>> {
        load_orders_csv(file)
    }
}

/// 测试用配置：输出放在 `root` 下，等待时间很短
pub fn test_config(root: &Path) -> Config {
    let output_dir = root.join("output");
    Config {
        order_page_url: ORDER_PAGE_URL.to_string(),
        local_csv_path: root.join("orders.csv"),
        receipts_dir: output_dir.join("receipts"),
        screenshots_dir: output_dir.join("screenshots"),
        archive_path: output_dir.join("receipts.zip"),
        warn_file: output_dir.join("warn.txt").to_string_lossy().into_owned(),
        output_dir,
        max_submit_retries: 3,
        action_timeout_ms: 200,
        poll_interval_ms: 1,
        ..Config::default()
    }
}

pub fn record(row: usize, address: &str) -> OrderRecord {
    OrderRecord {
        row,
        order_number: Some(row.to_string()),
        head: "1".to_string(),
        body: "2".to_string(),
        legs: "3".to_string(),
        address: address.to_string(),
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width.max(1), height.max(1), image::Rgb([90, 140, 200]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn single_page_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(Dictionary::new(), b"BT ET".to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(595),
            Object::Integer(842),
        ],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1_i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

pub fn page_count(pdf: &Path) -> usize {
    Document::load(pdf).unwrap().get_pages().len()
}

/// 目录下的文件名，排序后返回
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn zip_entries(archive: &Path) -> Vec<String> {
    let file = std::fs::File::open(archive).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    let mut names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}
