// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use owo_colors::Style;

// Stylesheet used to colorize prints.
#[derive(Debug, Default)]
pub(crate) struct Styles {
    pub heading_style: Style,
    pub property_style: Style,
    pub value_style: Style,
    pub failure_style: Style,
}

impl Styles {
    pub(crate) fn colorize(&mut self) {
        self.heading_style = Style::new().bright_blue().bold();
        self.property_style = Style::new().bright_green();
        self.value_style = Style::new().bright_white();
        self.failure_style = Style::new().bright_red();
    }

    /// A stylesheet which is coloured only when stdout supports it
    pub(crate) fn for_stdout() -> Self {
        let mut styles = Self::default();
        if supports_color::on(supports_color::Stream::Stdout).is_some() {
            styles.colorize();
        }
        styles
    }
}
