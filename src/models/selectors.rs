use serde::{Deserialize, Serialize};

/// 下单页面的 CSS 定位器
///
/// 默认值对应 RobotSpareBin 的下单页；站点改版时可以通过 TOML 文件覆盖部分字段。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// 弹窗中的确认按钮
    pub modal_dismiss: String,
    pub head_select: String,
    /// `{body}` 会被替换为订单的 Body 值
    pub body_radio_template: String,
    pub legs_input: String,
    pub address_input: String,
    pub preview_button: String,
    pub submit_button: String,
    /// 提交失败时出现的错误提示
    pub validation_alert: String,
    pub receipt: String,
    pub order_id: String,
    pub preview_image: String,
    pub order_another_button: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            modal_dismiss: ".modal-content .btn-dark".to_string(),
            head_select: "#head".to_string(),
            body_radio_template: "#id-body-{body}".to_string(),
            legs_input: "input[placeholder='Enter the part number for the legs']".to_string(),
            address_input: "#address".to_string(),
            preview_button: "#preview".to_string(),
            submit_button: "#order".to_string(),
            validation_alert: ".alert-danger".to_string(),
            receipt: "#receipt".to_string(),
            order_id: "#receipt > p:nth-of-type(1)".to_string(),
            preview_image: "#robot-preview-image".to_string(),
            order_another_button: "#order-another".to_string(),
        }
    }
}

impl Selectors {
    /// 某个 Body 值对应的单选框
    pub fn body_radio(&self, body: &str) -> String {
        self.body_radio_template.replace("{body}", body)
    }
}
