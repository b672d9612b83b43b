// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Built-in per-network layer tables, in forward order.
//!
//! These mirror the networks whose traces were captured: each entry names
//! the layer, its kind, the ReLU flag, stride, and padding. Pooling and
//! normalization layers are not part of the captured traces and do not
//! appear here.

use crate::{LayerDef, LayerKind, ModelError};

/// Names of the networks with a built-in table.
pub const AVAILABLE: &[&str] = &["bvlc_alexnet", "vgg_cnn_s"];

/// The BVLC AlexNet layer table.
pub fn bvlc_alexnet() -> Vec<LayerDef> {
    use LayerKind::{Convolution as Conv, FullyConnected as Fc};
    vec![
        LayerDef::new("bvlc_alexnet", "conv1", Conv, true, 4, 0),
        LayerDef::new("bvlc_alexnet", "conv2", Conv, true, 1, 2),
        LayerDef::new("bvlc_alexnet", "conv3", Conv, true, 1, 1),
        LayerDef::new("bvlc_alexnet", "conv4", Conv, true, 1, 1),
        LayerDef::new("bvlc_alexnet", "conv5", Conv, true, 1, 1),
        LayerDef::new("bvlc_alexnet", "fc6", Fc, true, 1, 0),
        LayerDef::new("bvlc_alexnet", "fc7", Fc, true, 1, 0),
        LayerDef::new("bvlc_alexnet", "fc8", Fc, false, 1, 0),
    ]
}

/// The VGG CNN-S layer table.
pub fn vgg_cnn_s() -> Vec<LayerDef> {
    use LayerKind::{Convolution as Conv, FullyConnected as Fc};
    vec![
        LayerDef::new("vgg_cnn_s", "conv1", Conv, true, 2, 0),
        LayerDef::new("vgg_cnn_s", "conv2", Conv, true, 1, 0),
        LayerDef::new("vgg_cnn_s", "conv3", Conv, true, 1, 1),
        LayerDef::new("vgg_cnn_s", "conv4", Conv, true, 1, 1),
        LayerDef::new("vgg_cnn_s", "conv5", Conv, true, 1, 1),
        LayerDef::new("vgg_cnn_s", "fc6", Fc, true, 1, 0),
        LayerDef::new("vgg_cnn_s", "fc7", Fc, true, 1, 0),
        LayerDef::new("vgg_cnn_s", "fc8", Fc, false, 1, 0),
    ]
}

/// Looks up a built-in network table by name.
pub fn by_name(name: &str) -> Result<Vec<LayerDef>, ModelError> {
    match name {
        "bvlc_alexnet" => Ok(bvlc_alexnet()),
        "vgg_cnn_s" => Ok(vgg_cnn_s()),
        other => Err(ModelError::UnknownNetwork(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alexnet_table() {
        let net = bvlc_alexnet();
        assert_eq!(net.len(), 8);
        assert_eq!(net[0].name, "conv1");
        assert_eq!(net[0].stride, 4);
        assert_eq!(net[1].padding, 2);
        // fc8 is the only layer without ReLU.
        assert!(net[..7].iter().all(|l| l.relu));
        assert!(!net[7].relu);
        assert_eq!(net[7].kind, LayerKind::FullyConnected);
    }

    #[test]
    fn test_vgg_table() {
        let net = vgg_cnn_s();
        assert_eq!(net.len(), 8);
        assert_eq!(net[0].stride, 2);
        assert_eq!(net[1].padding, 0);
        assert!(net.iter().all(|l| l.network == "vgg_cnn_s"));
    }

    #[test]
    fn test_by_name() {
        assert_eq!(by_name("bvlc_alexnet").unwrap().len(), 8);
        assert_eq!(by_name("vgg_cnn_s").unwrap().len(), 8);
        assert!(matches!(
            by_name("resnet50"),
            Err(ModelError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn test_forward_order() {
        // Convolutions first, then fully-connected.
        let net = bvlc_alexnet();
        let first_fc = net
            .iter()
            .position(|l| l.kind == LayerKind::FullyConnected)
            .unwrap();
        assert!(net[first_fc..]
            .iter()
            .all(|l| l.kind == LayerKind::FullyConnected));
    }
}
