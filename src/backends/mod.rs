// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstractions for capture hardware

pub mod camera;
