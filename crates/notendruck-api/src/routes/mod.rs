// SPDX-License-Identifier: MIT

pub mod health;
pub mod printables;
