pub mod output;

pub use output::{
    card_width, render_banner, render_card, render_message, render_price_state, render_profile,
    render_recommendations,
};
