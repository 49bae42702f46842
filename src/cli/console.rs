//! Console presentation layer.
//!
//! Views are printed with their buttons numbered so the shell can press a
//! button by position; deliveries are printed instead of uploaded.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::channel::{AudioAsset, DeliveryChannel, DeliveryError, Presenter};
use crate::model::format_duration;
use crate::navigation::View;

/// Prints views to stdout and remembers the last one.
#[derive(Default)]
pub struct ConsolePresenter {
    last: Mutex<Option<View>>,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Action of the `n`th (1-based) button of the last view.
    pub fn button_action(&self, n: usize) -> Option<String> {
        let last = self.last.lock();
        let view = last.as_ref()?;
        view.buttons().nth(n.checked_sub(1)?).map(|b| b.action.clone())
    }
}

#[async_trait]
impl Presenter for ConsolePresenter {
    async fn show(&self, view: &View) {
        println!("{}", render(view));
        *self.last.lock() = Some(view.clone());
    }

    async fn status(&self, text: &str) {
        println!("{}\n", text);
    }
}

/// Text of a view with numbered button rows.
pub fn render(view: &View) -> String {
    let mut out = view.text.clone();
    let mut n = 0;
    for row in &view.rows {
        out.push('\n');
        let cells: Vec<String> = row
            .iter()
            .map(|button| {
                n += 1;
                format!("[{}] {}", n, button.label)
            })
            .collect();
        out.push_str("  ");
        out.push_str(&cells.join("   "));
    }
    out.push('\n');
    out
}

/// Delivery channel that prints each asset.
pub struct ConsoleChannel;

#[async_trait]
impl DeliveryChannel for ConsoleChannel {
    async fn send_audio(&self, asset: &AudioAsset) -> Result<(), DeliveryError> {
        if asset.external_ref.is_empty() {
            return Err(DeliveryError::AssetUnavailable(asset.title.clone()));
        }
        println!(
            "🎧 {} - {} ({}) <{}>",
            asset.performer,
            asset.title,
            format_duration(asset.duration),
            asset.external_ref
        );
        println!("{}\n", asset.caption);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::Button;

    fn view() -> View {
        let mut view = View::text("Pick one");
        view.push_button(Button {
            label: "First".to_string(),
            action: "artist:a::0".to_string(),
        });
        view.push_button(Button {
            label: "Second".to_string(),
            action: "artist:b::0".to_string(),
        });
        view
    }

    #[test]
    fn test_render_numbers_buttons() {
        let text = render(&view());
        assert!(text.starts_with("Pick one"));
        assert!(text.contains("[1] First"));
        assert!(text.contains("[2] Second"));
    }

    #[tokio::test]
    async fn test_button_action_by_position() {
        let presenter = ConsolePresenter::new();
        assert_eq!(presenter.button_action(1), None);

        presenter.show(&view()).await;
        assert_eq!(presenter.button_action(2).as_deref(), Some("artist:b::0"));
        assert_eq!(presenter.button_action(0), None);
        assert_eq!(presenter.button_action(3), None);
    }
}
