use std::str::FromStr;

use super::CtrAccessor;
use crate::{
    error::{AccessorErr, Result},
    layout::Counter,
};

/// A record dump with fewer fields than this can't even hold the statistics.
const MIN_FIELDS: usize = 6;

impl<C: Counter> CtrAccessor<C> {
    /// Renders a full record as space separated text.
    ///
    /// Every field the record holds before the embedx weights is written, the
    /// counters as a single number each. The embedx weights follow only when the
    /// feature is important enough to keep them and the caller holds them.
    ///
    /// # Arguments
    /// * `value` - The full record.
    /// * `param` - The amount of slots the caller holds for the record.
    ///
    /// # Returns
    /// The text dump, or an error if `value` isn't a full record.
    pub fn parse_to_string(&self, value: &[f32], param: usize) -> Result<String> {
        let value = self.feature(value)?;
        let layout = value.layout();

        let mut tokens = vec![
            value.unseen_days().to_string(),
            value.delta_score().to_string(),
            value.show().to_string(),
            value.click().to_string(),
        ];

        let prefix = if value.has_mf() {
            layout.embedx_w_index()
        } else {
            layout.short_slots()
        };
        let slots = value.as_slice();
        tokens.extend(slots[layout.embed_w_index()..prefix].iter().map(f32::to_string));

        let score = self.show_click_score(value.show(), value.click());
        if score >= C::from_f32(self.embedx_threshold) && param > layout.embedx_w_index() {
            if let Some(embedx_w) = value.embedx_w() {
                tokens.extend(embedx_w.iter().map(f32::to_string));
            }
        }

        Ok(tokens.join(" "))
    }

    /// Restores a full record from its text dump.
    ///
    /// The embedx region, when the record holds it, is zeroed through the embedx
    /// rule first so that a dump without embedx weights restores a usable record.
    /// Tokens may be separated by whitespace or commas. Nothing is written unless
    /// the whole dump parses.
    ///
    /// # Arguments
    /// * `text` - The text dump.
    /// * `value` - The full record to restore.
    ///
    /// # Returns
    /// The amount of fields parsed, or an error if the dump doesn't fit the record.
    pub fn parse_from_string(&self, text: &str, value: &mut [f32]) -> Result<usize> {
        let mut value = self.feature_mut(value)?;
        let layout = *value.layout();

        let tokens: Vec<&str> = text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .collect();

        if tokens.len() < MIN_FIELDS {
            return Err(AccessorErr::TooFewFields {
                got: tokens.len(),
                min: MIN_FIELDS,
            });
        }

        let holds = value.as_slice().len() - 2 * (C::SLOTS - 1);
        if tokens.len() > holds {
            return Err(AccessorErr::TooManyFields {
                got: tokens.len(),
                max: holds,
            });
        }

        let show: C = parse_token(&tokens, 2)?;
        let click: C = parse_token(&tokens, 3)?;
        let rest = (4..tokens.len())
            .map(|position| parse_token::<f32>(&tokens, position))
            .collect::<Result<Vec<_>>>()?;

        if let Some((w, accum)) = value.embedx_mut() {
            self.embedx_rule.init_value(w, accum, true);
        }

        value.set_unseen_days(parse_token(&tokens, 0)?);
        value.set_delta_score(parse_token(&tokens, 1)?);
        value.set_show(show);
        value.set_click(click);

        let start = layout.embed_w_index();
        value.as_mut_slice()[start..start + rest.len()].copy_from_slice(&rest);

        Ok(tokens.len())
    }
}

fn parse_token<T: FromStr>(tokens: &[&str], position: usize) -> Result<T> {
    tokens[position]
        .parse()
        .map_err(|_| AccessorErr::InvalidToken {
            position,
            token: tokens[position].to_string(),
        })
}
